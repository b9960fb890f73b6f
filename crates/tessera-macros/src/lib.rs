// Copyright 2026 the Tessera authors
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

//! Procedural macros for the Tessera reflection system.

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, Data, DeriveInput, Fields, LitStr};

/// A derive macro that implements `tessera_reflect::Serialize` and
/// `tessera_reflect::Field` for a struct with named fields, visiting
/// each field through the archive protocol.
///
/// Field attributes:
/// - `#[serializable(skip)]` leaves the field out of serialization.
/// - `#[serializable(name = "...")]` overrides the stored field name.
/// - `#[serializable(label = "...")]` overrides the display label.
///
/// Without an explicit label, one is derived from the field name:
/// underscores become spaces and the first letter is capitalized.
#[proc_macro_derive(Serializable, attributes(serializable))]
pub fn derive_serializable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    let name = &input.ident;
    let (impl_generics, ty_generics, where_clause) = input.generics.split_for_impl();

    let Data::Struct(data) = &input.data else {
        return syn::Error::new_spanned(&input.ident, "Serializable only supports structs")
            .to_compile_error()
            .into();
    };
    let Fields::Named(fields) = &data.fields else {
        return syn::Error::new_spanned(
            &input.ident,
            "Serializable only supports structs with named fields",
        )
        .to_compile_error()
        .into();
    };

    let mut visits = Vec::new();
    for field in &fields.named {
        let ident = field.ident.as_ref().expect("named field");
        let mut skip = false;
        let mut stored_name = ident.to_string();
        let mut label = None;
        for attr in &field.attrs {
            if !attr.path().is_ident("serializable") {
                continue;
            }
            let result = attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("skip") {
                    skip = true;
                    Ok(())
                } else if meta.path.is_ident("name") {
                    stored_name = meta.value()?.parse::<LitStr>()?.value();
                    Ok(())
                } else if meta.path.is_ident("label") {
                    label = Some(meta.value()?.parse::<LitStr>()?.value());
                    Ok(())
                } else {
                    Err(meta.error("expected `skip`, `name = \"...\"` or `label = \"...\"`"))
                }
            });
            if let Err(err) = result {
                return err.to_compile_error().into();
            }
        }
        if skip {
            continue;
        }
        let label = label.unwrap_or_else(|| default_label(&stored_name));
        visits.push(quote! {
            ok &= tessera_reflect::Field::visit(&mut self.#ident, ar, #stored_name, #label);
        });
    }

    let expanded = quote! {
        impl #impl_generics tessera_reflect::Serialize for #name #ty_generics #where_clause {
            fn serialize(&mut self, ar: &mut dyn tessera_reflect::Archive) -> bool {
                let mut ok = true;
                #(#visits)*
                ok
            }
        }

        impl #impl_generics tessera_reflect::Field for #name #ty_generics #where_clause {
            fn visit(
                &mut self,
                ar: &mut dyn tessera_reflect::Archive,
                name: &str,
                label: &str,
            ) -> bool {
                ar.struct_value(tessera_reflect::StructRef::new(self), name, label)
            }
        }
    };

    TokenStream::from(expanded)
}

fn default_label(name: &str) -> String {
    let mut label = name.replace('_', " ");
    if let Some(first) = label.get(0..1) {
        let upper = first.to_ascii_uppercase();
        label.replace_range(0..1, &upper);
    }
    label
}
