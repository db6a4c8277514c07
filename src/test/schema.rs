#[cfg(test)]
mod tests {
    use crate::database::{FESTIVAL_TABLES, Schema, TableDef};
    use crate::error::AppError;

    const PARENT: TableDef = TableDef {
        name: "parent",
        create_sql: r#"CREATE TABLE IF NOT EXISTS "parent" ("id" INTEGER PRIMARY KEY)"#,
    };

    const CHILD: TableDef = TableDef {
        name: "child",
        create_sql: r#"CREATE TABLE IF NOT EXISTS "child" (
            "id" INTEGER PRIMARY KEY,
            "parent_id" INTEGER,
            FOREIGN KEY("parent_id") REFERENCES "parent"("id")
        )"#,
    };

    const SELF_REFERENCING: TableDef = TableDef {
        name: "nodes",
        create_sql: r#"CREATE TABLE IF NOT EXISTS "nodes" (
            "id" INTEGER PRIMARY KEY,
            "parent_id" INTEGER REFERENCES nodes(id)
        )"#,
    };

    const LOOP_A: TableDef = TableDef {
        name: "loop_a",
        create_sql: r#"CREATE TABLE "loop_a" ("b_id" INTEGER REFERENCES "loop_b"("id"))"#,
    };

    const LOOP_B: TableDef = TableDef {
        name: "loop_b",
        create_sql: r#"CREATE TABLE "loop_b" ("a_id" INTEGER REFERENCES "loop_a"("id"))"#,
    };

    #[test]
    fn test_festival_order_keeps_declaration_order() {
        let schema = Schema::festival().expect("Festival schema should resolve");

        assert_eq!(
            schema.table_names(),
            vec![
                "event_days",
                "users",
                "stages",
                "genres",
                "performances",
                "ticket_types",
                "tickets",
            ]
        );
        assert_eq!(schema.table_count(), FESTIVAL_TABLES.len());
    }

    #[test]
    fn test_teardown_is_reverse_of_creation() {
        let schema = Schema::festival().unwrap();

        let creation: Vec<&str> = schema.creation_order().map(|t| t.name).collect();
        let mut teardown: Vec<&str> = schema.teardown_order().map(|t| t.name).collect();
        teardown.reverse();

        assert_eq!(creation, teardown);
    }

    #[test]
    fn test_every_table_follows_its_references() {
        let schema = Schema::festival().unwrap();
        let order = schema.table_names();

        for table in schema.creation_order() {
            let position = order.iter().position(|n| *n == table.name).unwrap();
            for referenced in table.references() {
                let referenced_position = order.iter().position(|n| *n == referenced).unwrap();
                assert!(
                    referenced_position < position,
                    "{} must come after {}",
                    table.name,
                    referenced
                );
            }
        }
    }

    #[test]
    fn test_references_are_read_from_ddl() {
        let performances = FESTIVAL_TABLES
            .iter()
            .find(|t| t.name == "performances")
            .unwrap();
        assert_eq!(
            performances.references(),
            vec!["event_days", "genres", "stages", "users"]
        );

        let genres = FESTIVAL_TABLES.iter().find(|t| t.name == "genres").unwrap();
        assert!(genres.references().is_empty());
    }

    #[test]
    fn test_referenced_table_moves_ahead() {
        let schema = Schema::resolve(&[CHILD, PARENT]).unwrap();
        assert_eq!(schema.table_names(), vec!["parent", "child"]);
    }

    #[test]
    fn test_self_reference_is_ignored() {
        let schema = Schema::resolve(&[SELF_REFERENCING]).unwrap();
        assert_eq!(schema.table_names(), vec!["nodes"]);
    }

    #[test]
    fn test_cycle_is_rejected() {
        let result = Schema::resolve(&[PARENT, LOOP_A, LOOP_B]);

        match result {
            Err(AppError::Schema(message)) => {
                assert!(message.contains("loop_a"));
                assert!(message.contains("loop_b"));
                assert!(!message.contains("parent"));
            }
            other => panic!("Expected a schema error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_reference_is_rejected() {
        let result = Schema::resolve(&[CHILD]);
        assert!(matches!(result, Err(AppError::Schema(m)) if m.contains("unknown table parent")));
    }

    #[test]
    fn test_duplicate_table_is_rejected() {
        let result = Schema::resolve(&[PARENT, PARENT]);
        assert!(matches!(result, Err(AppError::Schema(_))));
    }
}
