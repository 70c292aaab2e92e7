use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "grammar/swq.pest"]
pub struct SqlParser;
