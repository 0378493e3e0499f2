// Output formatting — terminal summaries of generated topic terms.

pub mod terminal;
