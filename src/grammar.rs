use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "./grammar.pest"] // Shared by the expression lexer and the definition-line parser
pub(crate) struct EquationGrammar;
