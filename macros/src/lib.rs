use proc_macro::TokenStream;

mod task;

#[proc_macro_attribute]
pub fn task (attr: TokenStream, item: TokenStream) -> TokenStream
{
	task::task_impl (attr, item)
}
