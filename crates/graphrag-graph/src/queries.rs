//! Read statements for the knowledge graph.

use crate::statement::Statement;

/// Every node reached by one outgoing hop, of any relationship type, from
/// any node named `name`.
///
/// No depth or type filter and no LIMIT: callers get the full fan-out, and
/// duplicate names fan out further.
pub fn related_nodes(name: &str) -> Statement {
    Statement::new("MATCH (n)-[r]->(m) WHERE n.name = $name RETURN m")
        .param("name", name)
        .returns("m")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_related_nodes_binds_name() {
        let stmt = related_nodes("Alice");
        assert_eq!(stmt.params["name"], "Alice");
        assert_eq!(stmt.columns, vec!["m".to_string()]);
        assert!(stmt.unbound_placeholders().is_empty());
    }

    #[test]
    fn test_related_nodes_name_is_never_spliced() {
        let stmt = related_nodes("x' OR 1=1 //");
        assert!(!stmt.text.contains("OR 1=1"));
        assert_eq!(stmt.params["name"], "x' OR 1=1 //");
    }
}
