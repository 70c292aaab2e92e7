use crate::registry::CustomFunctionRegistrar;
use model::ParseOptions;

/// Settings visible to every operation evaluator.
#[derive(Clone, Copy)]
pub struct EvalContext<'a> {
    /// LIKE `_` matches a character rather than a byte.
    pub utf8_strings: bool,
    pub custom_functions: Option<&'a dyn CustomFunctionRegistrar>,
}

impl<'a> EvalContext<'a> {
    pub fn new(options: &ParseOptions) -> Self {
        Self {
            utf8_strings: options.utf8_strings,
            custom_functions: None,
        }
    }

    pub fn with_custom_functions(mut self, registrar: &'a dyn CustomFunctionRegistrar) -> Self {
        self.custom_functions = Some(registrar);
        self
    }
}

impl Default for EvalContext<'_> {
    fn default() -> Self {
        Self::new(&ParseOptions::default())
    }
}
