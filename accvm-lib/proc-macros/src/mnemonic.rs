use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::{format_ident, quote};
use syn::{parse_macro_input, parse_quote, ItemEnum};

pub fn mnemonic_impl(tokens: TokenStream) -> TokenStream {
    let def = parse_macro_input!(tokens as ItemEnum);
    let enum_name = &def.ident;
    let operand_attr: syn::Attribute = parse_quote!(#[operand]);

    let arms: Vec<_> = def
        .variants
        .iter()
        .map(|v| {
            let syn::Fields::Unit = v.fields else {
                panic!("This macro only supports unit variants");
            };
            let var_name = &v.ident;
            let text = var_name.to_string().to_uppercase();
            let exec_fn = format_ident!("exec_{}", var_name.to_string().to_lowercase());
            let takes_operand = v.attrs.iter().any(|attr| *attr == operand_attr);
            (
                quote! { Self::#var_name => #text, },
                quote! { Self::#var_name => #takes_operand, },
                quote! { Self::#var_name => #exec_fn(interp, operand), },
            )
        })
        .collect();

    let (str_arms, operand_arms, dispatch_arms): (TokenStream2, TokenStream2, TokenStream2) =
        itertools::multiunzip(arms);

    let variant_names = def.variants.iter().map(|v| &v.ident);
    let count = def.variants.len();

    quote! {
        impl #enum_name {
            pub const ALL: [Self; #count] = [#(Self::#variant_names),*];

            pub fn as_str(&self) -> &'static str {
                match self {
                    #str_arms
                }
            }

            pub fn takes_operand(&self) -> bool {
                match self {
                    #operand_arms
                }
            }

            pub fn dispatch(self, interp: &mut Interpreter, operand: &str) -> ExecResult {
                match self {
                    #dispatch_arms
                }
            }
        }
    }
    .into()
}
