use proc_macro::TokenStream;
mod mnemonic;

/// Used on the Mnemonic enum.
///
/// Every variant is a unit variant whose upper-cased name is the mnemonic as it
/// appears in source text. Variants that consume an operand are marked with
/// `#[operand]`.
///
/// This Macro generates the following:
/// * `Self::ALL`, an array containing every variant in declaration order
/// * `Self::as_str(&self) -> &'static str`, the source text of the mnemonic
/// * `Self::takes_operand(&self) -> bool`
/// * `Self::dispatch(self, &mut Interpreter, &str) -> ExecResult`
///   Every mnemonic will be executed at some point by the vm.
///   This function will call the associated function for a mnemonic. That fn must be called
///   `exec_<mnemonic in lowercase>(interp: &mut Interpreter, operand: &str)`. And the symbol must be
///   available where the enum is defined
#[proc_macro_derive(Mnemonic, attributes(operand))]
pub fn mnemonic(tokens: TokenStream) -> TokenStream {
    mnemonic::mnemonic_impl(tokens)
}
