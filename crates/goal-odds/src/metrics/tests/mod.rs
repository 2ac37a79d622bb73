mod common;
mod context;
