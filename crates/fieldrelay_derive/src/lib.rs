use proc_macro::TokenStream;
use proc_macro2::{Ident, Span, TokenStream as TokenStream2};
use proc_macro_crate::{FoundCrate, crate_name};
use quote::quote;
use syn::{Data, DeriveInput, Fields, GenericArgument, LitStr, PathArguments, Type, parse_macro_input};

#[proc_macro_derive(FormRecord, attributes(form))]
pub fn derive_form_record(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let record_ident = input.ident;

    if !input.generics.params.is_empty() {
        return syn::Error::new_spanned(
            &record_ident,
            "FormRecord derive currently supports only non-generic structs",
        )
        .to_compile_error()
        .into();
    }

    let named_fields = match input.data {
        Data::Struct(data) => match data.fields {
            Fields::Named(fields) => fields.named,
            _ => {
                return syn::Error::new_spanned(
                    &record_ident,
                    "FormRecord derive requires a struct with named fields",
                )
                .to_compile_error()
                .into();
            }
        },
        _ => {
            return syn::Error::new_spanned(
                &record_ident,
                "FormRecord derive is only supported on structs",
            )
            .to_compile_error()
            .into();
        }
    };

    let fieldrelay = fieldrelay_path();
    let mut names = Vec::new();
    let mut decoders = Vec::new();

    for field in named_fields {
        let Some(field_ident) = field.ident else {
            continue;
        };
        let field_name = match rename_attr(&field.attrs) {
            Ok(Some(name)) => name,
            Ok(None) => field_ident.to_string(),
            Err(error) => return error.to_compile_error().into(),
        };

        let decode = match option_inner(&field.ty) {
            Some(inner) => quote! {
                match data.get(#field_name).filter(|value| !value.is_empty()) {
                    Some(value) => Some(
                        value.parse::<#inner>().map_err(|error| {
                            #fieldrelay::form::FormError::InvalidValue {
                                field: #field_name,
                                reason: error.to_string(),
                            }
                        })?,
                    ),
                    None => None,
                }
            },
            None => {
                let field_ty = field.ty;
                quote! {
                    data.get(#field_name)
                        .ok_or(#fieldrelay::form::FormError::MissingField(#field_name))?
                        .parse::<#field_ty>()
                        .map_err(|error| #fieldrelay::form::FormError::InvalidValue {
                            field: #field_name,
                            reason: error.to_string(),
                        })?
                }
            }
        };

        names.push(field_name);
        decoders.push(quote! { #field_ident: #decode });
    }

    quote! {
        impl #fieldrelay::form::FormRecord for #record_ident {
            const FIELD_NAMES: &'static [&'static str] = &[#(#names),*];

            fn from_form_data(
                data: &#fieldrelay::form::FormData,
            ) -> #fieldrelay::form::FormResult<Self> {
                Ok(Self {
                    #(#decoders,)*
                })
            }
        }
    }
    .into()
}

fn rename_attr(attrs: &[syn::Attribute]) -> syn::Result<Option<String>> {
    let mut renamed = None;
    for attr in attrs {
        if !attr.path().is_ident("form") {
            continue;
        }
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("name") {
                let value: LitStr = meta.value()?.parse()?;
                renamed = Some(value.value());
                Ok(())
            } else {
                Err(meta.error("unsupported form attribute, expected `name = \"...\"`"))
            }
        })?;
    }
    Ok(renamed)
}

fn option_inner(ty: &Type) -> Option<&Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last()?;
    if segment.ident != "Option" {
        return None;
    }
    let PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}

fn fieldrelay_path() -> TokenStream2 {
    match crate_name("fieldrelay") {
        Ok(FoundCrate::Name(name)) => {
            let ident = Ident::new(&name, Span::call_site());
            quote!(::#ident)
        }
        Ok(FoundCrate::Itself) | Err(_) => quote!(::fieldrelay),
    }
}
