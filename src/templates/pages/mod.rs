pub mod imoveis;

pub use imoveis::{grid_fragment, imoveis_page, GridVm};
