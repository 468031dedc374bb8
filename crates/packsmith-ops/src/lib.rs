pub mod ops_check;
pub mod ops_init;
pub mod ops_resolve;
pub mod ops_tree;
pub mod ops_workspace;
