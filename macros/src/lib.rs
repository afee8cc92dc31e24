use std::collections::HashSet;

use proc_macro::TokenStream;
use quote::{format_ident, quote};
use syn::parse::{Parse, ParseStream};
use syn::spanned::Spanned;
use syn::{Attribute, Ident, ImplItem, ItemImpl, LitInt, LitStr, Meta, Token, Type, parse_macro_input};

const METHODS: [&str; 5] = ["get", "post", "put", "delete", "patch"];

/// Types that utoipa already knows how to describe inline; they never go
/// into `components(schemas(...))`.
const INLINE_TYPES: [&str; 10] = ["String", "str", "bool", "i32", "i64", "u16", "u32", "u64", "usize", "Vec"];

/// Turns an `impl` block into an axum router and an OpenAPI description.
///
/// Usage:
/// ```rust,ignore
/// struct UserController;
///
/// #[keel_macros::controller(state = AppState)]
/// impl UserController {
///     #[keel_macros::get("/{id}")]
///     #[keel_macros::responds(status = 200, body = User, description = "User found")]
///     #[keel_macros::responds(status = 404, body = Message, description = "No such user")]
///     async fn show(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Json<User>> {
///         ...
///     }
/// }
/// ```
///
/// This implements `keel_core::controller::Controller` for the type, with
/// `router()` registering every annotated method, and emits `UserControllerApi`
/// (a `utoipa::OpenApi`) listing the same paths, tagged with the controller
/// name. Without `state = ...` the router state is `()`.
#[proc_macro_attribute]
pub fn controller(args: TokenStream, input: TokenStream) -> TokenStream {
    let args = parse_macro_input!(args as ControllerArgs);
    let impl_block = parse_macro_input!(input as ItemImpl);

    match expand_controller(args, impl_block) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

struct ControllerArgs {
    state: Option<Type>,
}

impl Parse for ControllerArgs {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if input.is_empty() {
            return Ok(ControllerArgs { state: None });
        }

        let key: Ident = input.parse()?;
        if key != "state" {
            return Err(syn::Error::new(key.span(), format!("Unknown argument: {key}")));
        }
        input.parse::<Token![=]>()?;
        let state = input.parse()?;
        input.parse::<Option<Token![,]>>()?;

        Ok(ControllerArgs { state: Some(state) })
    }
}

fn expand_controller(args: ControllerArgs, impl_block: ItemImpl) -> syn::Result<proc_macro2::TokenStream> {
    let self_ty = &impl_block.self_ty;
    let struct_name = match &**self_ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .map(|segment| segment.ident.clone())
            .ok_or_else(|| syn::Error::new(self_ty.span(), "Expected a struct type"))?,
        _ => return Err(syn::Error::new(impl_block.span(), "Expected a struct type")),
    };
    let state_ty = match &args.state {
        Some(ty) => quote! { #ty },
        None => quote! { () },
    };
    let tag = struct_name.to_string();

    let mut registrations = Vec::new();
    let mut doc_functions = Vec::new();
    let mut doc_paths = Vec::new();
    let mut schemas = Vec::new();
    let mut seen = HashSet::new();

    for item in &impl_block.items {
        let ImplItem::Fn(method) = item else {
            continue;
        };
        let Some((verb, path)) = route_attr(&method.attrs)? else {
            continue;
        };

        let fn_name = &method.sig.ident;
        let verb = format_ident!("{}", verb);

        registrations.push(quote! {
            router = router.route(#path, axum::routing::#verb(#self_ty::#fn_name));
        });

        let responses = responds_attrs(&method.attrs)?;
        for response in &responses {
            if let Some(body) = &response.body {
                if is_component(body) && seen.insert(quote!(#body).to_string()) {
                    schemas.push(body.clone());
                }
            }
        }
        let response_tokens: Vec<_> = responses.iter().map(ResponseSpec::to_tokens).collect();

        let operation_id = fn_name.to_string();
        let mut path_args = quote! {
            #verb,
            path = #path,
            operation_id = #operation_id,
            tag = #tag
        };
        if !response_tokens.is_empty() {
            path_args.extend(quote! { , responses(#(#response_tokens),*) });
        }
        if let Some(body) = single_type_attr(&method.attrs, "accepts")? {
            path_args.extend(quote! { , request_body = #body });
            if is_component(&body) && seen.insert(quote!(#body).to_string()) {
                schemas.push(body);
            }
        }
        if let Some(scheme) = secured_attr(&method.attrs)? {
            path_args.extend(quote! { , security((#scheme = [])) });
        }

        // The documentation twin keeps the handler's signature so utoipa can
        // read `Path`/`Query` extractors; it lives at module level because
        // `#[utoipa::path]` cannot sit inside an impl block here.
        let doc_fn = format_ident!("__doc_{}_{}", struct_name, fn_name);
        let asyncness = &method.sig.asyncness;
        let generics = &method.sig.generics;
        let where_clause = &method.sig.generics.where_clause;
        let inputs = &method.sig.inputs;
        let output = &method.sig.output;

        doc_functions.push(quote! {
            #[doc = concat!("OpenAPI description of `", #tag, "::", #operation_id, "`.")]
            #[allow(non_snake_case, unused_variables, unused_mut, dead_code)]
            #[utoipa::path(#path_args)]
            #asyncness fn #doc_fn #generics(#inputs) #output #where_clause {
                unreachable!("documentation-only handler")
            }
        });
        doc_paths.push(doc_fn);
    }

    let api_struct_name = format_ident!("{}Api", struct_name);
    let openapi_attr = if schemas.is_empty() {
        quote! {
            #[derive(utoipa::OpenApi)]
            #[openapi(paths(#(#doc_paths),*))]
        }
    } else {
        quote! {
            #[derive(utoipa::OpenApi)]
            #[openapi(
                paths(#(#doc_paths),*),
                components(schemas(#(#schemas),*))
            )]
        }
    };

    Ok(quote! {
        #impl_block

        impl keel_core::controller::Controller for #self_ty {
            type State = #state_ty;

            fn router() -> axum::Router<Self::State> {
                let mut router = axum::Router::new();

                #(#registrations)*

                router
            }
        }

        #(#doc_functions)*

        #openapi_attr
        pub struct #api_struct_name;
    })
}

fn last_ident(attr: &Attribute) -> Option<String> {
    attr.path().segments.last().map(|segment| segment.ident.to_string())
}

fn is_component(ty: &Type) -> bool {
    match ty {
        Type::Path(type_path) => type_path
            .path
            .segments
            .last()
            .is_some_and(|segment| !INLINE_TYPES.contains(&segment.ident.to_string().as_str())),
        _ => false,
    }
}

/// Finds `#[get("/path")]` (or `#[keel_macros::get("/path")]`, and the other
/// verbs) on a method.
fn route_attr(attrs: &[Attribute]) -> syn::Result<Option<(String, String)>> {
    for attr in attrs {
        let Some(name) = last_ident(attr) else {
            continue;
        };
        if !METHODS.contains(&name.as_str()) {
            continue;
        }

        let Meta::List(meta) = &attr.meta else {
            return Err(syn::Error::new(attr.span(), format!("expected #[{name}(\"/path\")]")));
        };
        let path: LitStr = syn::parse2(meta.tokens.clone())?;

        return Ok(Some((name, path.value())));
    }

    Ok(None)
}

fn single_type_attr(attrs: &[Attribute], wanted: &str) -> syn::Result<Option<Type>> {
    for attr in attrs {
        if last_ident(attr).as_deref() == Some(wanted) {
            return attr.parse_args::<Type>().map(Some);
        }
    }

    Ok(None)
}

fn secured_attr(attrs: &[Attribute]) -> syn::Result<Option<LitStr>> {
    for attr in attrs {
        if last_ident(attr).as_deref() == Some("secured") {
            return attr.parse_args::<LitStr>().map(Some);
        }
    }

    Ok(None)
}

fn responds_attrs(attrs: &[Attribute]) -> syn::Result<Vec<ResponseSpec>> {
    attrs
        .iter()
        .filter(|attr| last_ident(attr).as_deref() == Some("responds"))
        .map(|attr| attr.parse_args::<ResponseSpec>())
        .collect()
}

/// One `#[responds(...)]` attribute:
/// - `#[responds(User)]` is status 200 with a `User` body
/// - `#[responds(status = 404, body = Message, description = "Not found")]`
/// - `#[responds(status = 200, body = String, content_type = "image/svg+xml")]`
/// - `#[responds(status = 204, description = "Deleted")]` has no body
struct ResponseSpec {
    status: u16,
    body: Option<Type>,
    description: String,
    content_type: Option<String>,
}

impl ResponseSpec {
    fn to_tokens(&self) -> proc_macro2::TokenStream {
        let status = proc_macro2::Literal::u16_unsuffixed(self.status);
        let description = &self.description;
        let mut tokens = quote! { status = #status, description = #description };

        if let Some(body) = &self.body {
            tokens.extend(quote! { , body = #body });
        }
        if let Some(content_type) = &self.content_type {
            tokens.extend(quote! { , content_type = #content_type });
        }

        quote! { (#tokens) }
    }
}

impl Parse for ResponseSpec {
    fn parse(input: ParseStream) -> syn::Result<Self> {
        if !input.peek2(Token![=]) {
            let body: Type = input.parse()?;

            return Ok(ResponseSpec {
                status: 200,
                body: Some(body),
                description: "Success".to_owned(),
                content_type: None,
            });
        }

        let mut status = None;
        let mut body = None;
        let mut description = None;
        let mut content_type = None;

        while !input.is_empty() {
            let key: Ident = input.parse()?;
            input.parse::<Token![=]>()?;

            match key.to_string().as_str() {
                "status" => status = Some(input.parse::<LitInt>()?.base10_parse::<u16>()?),
                "body" => body = Some(input.parse()?),
                "description" => description = Some(input.parse::<LitStr>()?.value()),
                "content_type" => content_type = Some(input.parse::<LitStr>()?.value()),
                other => return Err(syn::Error::new(key.span(), format!("Unknown argument: {other}"))),
            }

            if !input.is_empty() {
                input.parse::<Token![,]>()?;
            }
        }

        Ok(ResponseSpec {
            status: status.unwrap_or(200),
            body,
            description: description.unwrap_or_else(|| "Success".to_owned()),
            content_type,
        })
    }
}

/// Macro for GET route
#[proc_macro_attribute]
pub fn get(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Macro for POST route
#[proc_macro_attribute]
pub fn post(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Macro for PUT route
#[proc_macro_attribute]
pub fn put(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Macro for DELETE route
#[proc_macro_attribute]
pub fn delete(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Macro for PATCH route
#[proc_macro_attribute]
pub fn patch(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Documents one response of a route. Read by `#[controller]`; may repeat.
#[proc_macro_attribute]
pub fn responds(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Documents the request body type of a route. Read by `#[controller]`.
#[proc_macro_attribute]
pub fn accepts(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}

/// Marks a route as requiring the named security scheme in the OpenAPI
/// document. Enforcement is a router concern. Read by `#[controller]`.
#[proc_macro_attribute]
pub fn secured(_args: TokenStream, input: TokenStream) -> TokenStream {
    input
}
