//! Declarative macro for symbol enumerations

/// Declare an enum whose variants are version or context symbols.
///
/// Each variant maps to a path fragment (`""` for none) and may be marked
/// disabled. The generated type implements
/// [`SymbolSource`](crate::loader::SymbolSource).
///
/// # Example
///
/// ```rust
/// use apimount_core::{symbol_set, SymbolSource};
///
/// symbol_set! {
///     pub enum Audience: Context {
///         ADMIN => "admin",
///         OPEN => "open",
///         TEST => "testing" [enabled = false],
///     }
/// }
///
/// let set = Audience::symbol_set();
/// assert_eq!(set.entries().len(), 3);
/// ```
#[macro_export]
macro_rules! symbol_set {
    (@enabled) => {
        true
    };
    (@enabled $enabled:expr) => {
        $enabled
    };
    (
        $(#[$meta:meta])*
        $vis:vis enum $name:ident : $kind:ident {
            $( $variant:ident => $fragment:literal $([enabled = $enabled:expr])? ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[allow(non_camel_case_types)]
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
        $vis enum $name {
            $($variant),*
        }

        impl $crate::loader::SymbolSource for $name {
            const KIND: $crate::registry::SymbolKind = $crate::registry::SymbolKind::$kind;
            const SET_NAME: &'static str = stringify!($name);

            fn all() -> &'static [Self] {
                &[$($name::$variant),*]
            }

            fn symbol_name(&self) -> &'static str {
                match self {
                    $($name::$variant => stringify!($variant)),*
                }
            }

            fn fragment(&self) -> Option<&'static str> {
                let fragment: &'static str = match self {
                    $($name::$variant => $fragment),*
                };
                if fragment.is_empty() {
                    None
                } else {
                    Some(fragment)
                }
            }

            fn is_enabled(&self) -> bool {
                match self {
                    $($name::$variant => $crate::symbol_set!(@enabled $($enabled)?)),*
                }
            }
        }
    };
}
