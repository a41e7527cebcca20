use darling::{FromMeta, Error};
use darling::ast::NestedMeta;
use darling::util::Flag;
use proc_macro2::Span;
use syn::{ItemFn, ReturnType, Token, Type, parse, parse2, parse_quote};
use syn_derive::Parse;
use quote::quote;

#[derive (FromMeta)]
struct TaskInput
{
	spawned: Flag,
	preemptive: Flag
}

#[allow (dead_code)]
#[derive (Parse)]
struct TaskMarker
{
	output: Type,
	comma_token: Token! [,],
	error: Type
}

fn scan_return_marker (output: &ReturnType) -> syn::Result <TaskMarker>
{
	let ty = match output
	{
		ReturnType::Type (_, ty) => &**ty,
		ReturnType::Default => return Err
		(
			syn::Error::new
			(
				Span::call_site (),
				"task functions must return task! (Output, Error)"
			)
		)
	};

	let type_macro = match ty
	{
		Type::Macro (type_macro) => type_macro,
		_ => return Err
		(
			syn::Error::new_spanned
			(
				ty,
				"task functions must return task! (Output, Error)"
			)
		)
	};

	match type_macro . mac . path . get_ident ()
	{
		Some (ident) if ident == "task" => (),
		_ => return Err
		(
			syn::Error::new_spanned
			(
				&type_macro . mac . path,
				"task functions must return task! (Output, Error)"
			)
		)
	}

	parse2 (type_macro . mac . tokens . clone ())
}

fn gen_task
(
	function: ItemFn,
	marker: TaskMarker,
	spawned: bool,
	preemptive: bool
)
-> proc_macro2::TokenStream
{
	let ItemFn {attrs, vis, mut sig, block} = function;

	let TaskMarker {output, error, ..} = marker;

	sig . asyncness = None;

	let constructor = match (spawned, preemptive)
	{
		(false, false) => quote! (task_driver::driver::start),
		(false, true) => quote! (task_driver::driver::start_preemptive),
		(true, false) => quote! (task_driver::driver::spawn),
		(true, true) => quote! (task_driver::driver::spawn_preemptive)
	};

	let handle_type: Type = match spawned
	{
		false => parse_quote!
		(
			task_driver::task_handle::TaskHandle
			<
				impl std::future::Future
				<
					Output = task_driver::disposition::Disposition <#output, #error>
				>
			>
		),
		true => parse_quote!
		(
			task_driver::task_handle::SpawnedTaskHandle <#output, #error>
		)
	};

	sig . output = parse_quote!
	(
		-> (#handle_type, task_driver::canceller::Canceller)
	);

	quote!
	{
		#(#attrs)*
		#vis #sig
		{
			#constructor ((move || #block) ())
		}
	}
}

pub fn task_impl
(
	attr: proc_macro::TokenStream,
	item: proc_macro::TokenStream
)
-> proc_macro::TokenStream
{
	let mut errors = Error::accumulator ();

	let attr_args = errors . handle_in
	(
		||
		NestedMeta::parse_meta_list (attr . into ())
			. map_err (|e| e . into ())
	);

	let task_input = attr_args . and_then
	(
		|attr_args| errors . handle_in (|| TaskInput::from_list (&attr_args))
	);

	let function: Option <ItemFn> = errors . handle_in
	(
		|| parse (item) . map_err (|e| e . into ())
	);

	let marker = function . as_ref () . and_then
	(
		|function| errors . handle_in
		(
			||
			scan_return_marker (&function . sig . output)
				. map_err (|e| e . into ())
		)
	);

	match (task_input, function, marker)
	{
		(Some (TaskInput {spawned, preemptive}), Some (function), Some (marker)) =>
		{
			errors . finish () . unwrap ();

			gen_task
			(
				function,
				marker,
				spawned . is_present (),
				preemptive . is_present ()
			) . into ()
		},
		_ => errors . finish () . unwrap_err () . write_errors () . into ()
	}
}
