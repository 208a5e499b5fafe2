//! Structural comparison of documents.

/// Whether template and target carry the same number of tables.
pub fn tables_match(template_table_count: usize, target_table_count: usize) -> bool {
    template_table_count == target_table_count
}
