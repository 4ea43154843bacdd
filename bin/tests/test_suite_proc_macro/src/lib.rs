use quote::{format_ident, quote};

/// Emits one `#[test]` per `.lox` script below the given directory (relative to `bin/tests`),
/// each running the script through `lox_expect`.
#[proc_macro]
pub fn generate_tests(input: proc_macro::TokenStream) -> proc_macro::TokenStream {
    let dir = syn::parse_macro_input!(input as syn::LitStr).value();
    let root_dir = format!("{}/../{}", env!("CARGO_MANIFEST_DIR"), dir);

    let tests: Vec<proc_macro2::TokenStream> = walkdir::WalkDir::new(&root_dir)
        .sort_by_file_name()
        .into_iter()
        .flatten()
        .filter(|entry| entry.path().extension() == Some("lox".as_ref()))
        .map(|entry| {
            let script_path = entry.path().to_string_lossy().into_owned();
            let relative_path = entry.path().strip_prefix(&root_dir).unwrap().with_extension("");
            let test_ident = format_ident!(
                "test_{}",
                relative_path.to_string_lossy().replace(['/', '\\', '-', '.'], "_")
            );
            quote! {
                #[test]
                fn #test_ident() {
                    lox_expect(&std::fs::read_to_string(#script_path).unwrap());
                }
            }
        })
        .collect();

    assert!(!tests.is_empty(), "No .lox scripts found in {root_dir}");

    quote! {
        #[ctor::ctor]
        fn init() {
            env_logger::init();
        }

        #(#tests)*
    }
    .into()
}
