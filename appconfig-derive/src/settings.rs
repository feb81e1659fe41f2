use proc_macro2::TokenStream;
use quote::quote;
use syn::ext::IdentExt;
use syn::{Data, DeriveInput, Fields, Ident, LitStr, Type};

const TAG_KEYS: [&str; 3] = ["env", "arg", "short"];

struct ParsedField {
    ident: Ident,
    name: String,
    ty: Type,
    nested: bool,
    skip: bool,
    tags: Vec<(String, String)>,
}

fn parse_field(field: &syn::Field) -> syn::Result<ParsedField> {
    let ident = field
        .ident
        .clone()
        .ok_or_else(|| syn::Error::new_spanned(field, "expected a named field"))?;
    let mut parsed = ParsedField {
        name: ident.unraw().to_string(),
        ident,
        ty: field.ty.clone(),
        nested: false,
        skip: false,
        tags: Vec::new(),
    };

    for attr in &field.attrs {
        if !attr.path().is_ident("config") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("nested") {
                parsed.nested = true;
                return Ok(());
            }
            if meta.path.is_ident("skip") {
                parsed.skip = true;
                return Ok(());
            }
            if let Some(key) = TAG_KEYS.iter().find(|key| meta.path.is_ident(key)) {
                let value: LitStr = meta.value()?.parse()?;
                if *key != "env" {
                    check_flag_name(&value)?;
                }
                parsed.tags.push((key.to_string(), value.value()));
                return Ok(());
            }
            Err(meta.error(
                "unsupported config attribute, expected one of: env, arg, short, nested, skip",
            ))
        })?;
    }

    if parsed.skip && (parsed.nested || !parsed.tags.is_empty()) {
        return Err(syn::Error::new_spanned(
            &parsed.ident,
            "`skip` cannot be combined with other config attributes",
        ));
    }
    Ok(parsed)
}

/// Flag names are matched literally by clap: no leading dash, `=` or spaces.
fn check_flag_name(value: &LitStr) -> syn::Result<()> {
    let text = value.value();
    let name = text.split(',').next().unwrap_or_default();
    let problem = if name.trim().is_empty() {
        "flag name is empty"
    } else if name.starts_with('-') {
        "flag name must not start with '-'; dashes are added automatically"
    } else if name.contains('=') {
        "flag name must not contain '='"
    } else if name.chars().any(char::is_whitespace) {
        "flag name must not contain whitespace"
    } else {
        return Ok(());
    };
    Err(syn::Error::new_spanned(value, problem))
}

pub fn expand(input: &DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;

    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "Settings cannot be derived for generic types",
        ));
    }

    let fields = match &input.data {
        Data::Struct(data) => match &data.fields {
            Fields::Named(named) => &named.named,
            _ => {
                return Err(syn::Error::new_spanned(
                    name,
                    "Settings can only be derived for structs with named fields",
                ));
            }
        },
        _ => {
            return Err(syn::Error::new_spanned(
                name,
                "Settings can only be derived for structs",
            ));
        }
    };

    let parsed_fields = fields
        .iter()
        .map(parse_field)
        .collect::<syn::Result<Vec<_>>>()?
        .into_iter()
        .filter(|parsed| !parsed.skip)
        .collect::<Vec<_>>();

    let descriptors = parsed_fields.iter().map(|parsed| {
        let field_name = &parsed.name;
        let ty = &parsed.ty;
        let keys = parsed.tags.iter().map(|(key, _)| key);
        let values = parsed.tags.iter().map(|(_, value)| value);
        let shape = if parsed.nested {
            quote!(::appconfig::schema::nested::<#ty>)
        } else {
            quote!(::appconfig::schema::leaf::<#ty>)
        };
        quote! {
            ::appconfig::schema::Field {
                name: #field_name,
                tags: &[#((#keys, #values)),*],
                shape: #shape,
            }
        }
    });

    let arms = parsed_fields.iter().enumerate().map(|(index, parsed)| {
        let ident = &parsed.ident;
        if parsed.nested {
            quote! {
                [#index, rest @ ..] => ::appconfig::Settings::set_path(&mut self.#ident, rest, value),
            }
        } else {
            quote! {
                [#index] => ::appconfig::Leaf::assign(&mut self.#ident, value)
                    .map_err(::core::convert::Into::into),
            }
        }
    });

    Ok(quote! {
        impl ::appconfig::Settings for #name {
            const FIELDS: &'static [::appconfig::schema::Field] = &[#(#descriptors),*];

            #[allow(unused_variables)]
            fn set_path(
                &mut self,
                path: &[usize],
                value: ::appconfig::FieldValue,
            ) -> ::core::result::Result<(), ::appconfig::AccessError> {
                match path {
                    [] => ::core::result::Result::Err(::appconfig::AccessError::NotALeaf),
                    #(#arms)*
                    [index, ..] => ::core::result::Result::Err(
                        ::appconfig::AccessError::NoSuchField(*index),
                    ),
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use syn::parse_quote;

    fn error_of(input: DeriveInput) -> String {
        match expand(&input) {
            Ok(_) => panic!("expected a compile error"),
            Err(err) => err.to_string(),
        }
    }

    #[test]
    fn rejects_malformed_flag_names() {
        let cases: [(DeriveInput, &str); 4] = [
            (
                parse_quote! { struct A { #[config(arg = "-x")] a: String } },
                "must not start with '-'",
            ),
            (
                parse_quote! { struct A { #[config(short = "")] a: String } },
                "empty",
            ),
            (
                parse_quote! { struct A { #[config(arg = "a=b")] a: String } },
                "'='",
            ),
            (
                parse_quote! { struct A { #[config(arg = "my flag")] a: String } },
                "whitespace",
            ),
        ];
        for (input, expected) in cases {
            let msg = error_of(input);
            assert!(msg.contains(expected), "{msg}");
        }
    }

    #[test]
    fn env_tag_is_not_a_flag_name() {
        let input: DeriveInput = parse_quote! {
            struct A { #[config(env = "APP HOST")] a: String }
        };
        assert!(expand(&input).is_ok());
    }

    #[test]
    fn rejects_unsupported_shapes() {
        assert!(error_of(parse_quote! { struct T(u8); }).contains("named fields"));
        assert!(error_of(parse_quote! { enum E { A } }).contains("structs"));
        assert!(error_of(parse_quote! { struct G<T> { t: T } }).contains("generic"));
    }

    #[test]
    fn rejects_unknown_attribute_keys() {
        let msg = error_of(parse_quote! { struct A { #[config(default = "x")] a: String } });
        assert!(msg.contains("unsupported config attribute"));
    }

    #[test]
    fn rejects_skip_combined_with_tags() {
        let msg = error_of(parse_quote! { struct A { #[config(skip, arg = "a")] a: String } });
        assert!(msg.contains("`skip`"));
    }
}
