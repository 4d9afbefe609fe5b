use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, FnArg, ItemFn, Pat};

/// Automatically profile a search or build function when `perf_stats` is enabled.
///
/// The function body is wrapped with a timing guard that logs on exit if the
/// elapsed time exceeds the threshold. Compiles to nothing when the
/// `perf_stats` feature is disabled.
///
/// # Features
/// - Auto-detects `start` and `target` parameters and includes them in the log
///   line, so slow queries can be reproduced
/// - Threshold in milliseconds (default 1), or microseconds with a `us` suffix
/// - Uses Bevy's `info!` logging
///
/// # Example
/// ```ignore
/// #[profile]
/// pub fn create_abstract_path(&mut self, start: CellId, target: CellId) -> Result<Path, PathError> {
///     // ... search ...
/// }
///
/// #[profile(250us)]
/// fn connect_region(...) { ... }
/// ```
#[proc_macro_attribute]
pub fn profile(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);

    let threshold_us: u128 = parse_threshold_us(&attr.to_string());

    let attrs = &input.attrs;
    let vis = &input.vis;
    let sig = &input.sig;
    let block = &input.block;
    let fn_name_str = sig.ident.to_string();

    let has_param = |name: &str| {
        sig.inputs.iter().any(|arg| {
            if let FnArg::Typed(pat_type) = arg {
                if let Pat::Ident(pat_ident) = &*pat_type.pat {
                    return pat_ident.ident == name;
                }
            }
            false
        })
    };

    let endpoints = if has_param("start") && has_param("target") {
        quote! { format!(" {:?} -> {:?}", start, target) }
    } else {
        quote! { String::new() }
    };

    let output = quote! {
        #(#attrs)*
        #vis #sig {
            #[cfg(feature = "perf_stats")]
            let _profile_timer = {
                struct ProfileGuard {
                    name: &'static str,
                    endpoints: String,
                    start: std::time::Instant,
                }
                impl Drop for ProfileGuard {
                    fn drop(&mut self) {
                        let elapsed = self.start.elapsed();
                        if elapsed.as_micros() > #threshold_us {
                            bevy::log::info!("[PERF] {}{}: {:?}", self.name, self.endpoints, elapsed);
                        }
                    }
                }
                ProfileGuard {
                    name: #fn_name_str,
                    endpoints: #endpoints,
                    start: std::time::Instant::now(),
                }
            };

            #block
        }
    };

    output.into()
}

fn parse_threshold_us(attr: &str) -> u128 {
    let attr = attr.trim();
    if attr.is_empty() {
        return 1_000;
    }
    match attr.strip_suffix("us") {
        Some(micros) => micros.trim().parse().unwrap_or(1_000),
        None => attr.parse::<u128>().map(|ms| ms * 1_000).unwrap_or(1_000),
    }
}
