use lazy_static::lazy_static;
use std::collections::HashSet;

lazy_static! {
    /// Reserved words. An identifier spelled like one must be quoted.
    static ref RESERVED_WORDS: HashSet<&'static str> = HashSet::from([
        "AND", "OR", "NOT", "LIKE", "ILIKE", "IS", "NULL", "IN", "BETWEEN", "CAST",
        "DISTINCT", "ESCAPE", "SELECT", "LEFT", "JOIN", "WHERE", "ON", "ORDER", "BY",
        "FROM", "AS", "ASC", "DESC", "UNION", "ALL", "LIMIT", "OFFSET", "EXCEPT",
        "EXCLUDE",
    ]);
}

pub fn is_keyword(word: &str) -> bool {
    RESERVED_WORDS.contains(word.to_ascii_uppercase().as_str())
}
