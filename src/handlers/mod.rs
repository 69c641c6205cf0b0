//! Domain handlers and their registration under `Group.Name@operation` ids.

pub mod catalog;
pub mod diagnostics;

use crate::error::ConfigError;
use crate::routing::HandlerRegistry;

/// Register every handler this crate ships.
pub fn register(registry: &mut HandlerRegistry) -> Result<(), ConfigError> {
    use catalog::{brands, categories, products};

    registry
        .register("Catalog.Products@index", products::index)?
        .register("Catalog.Products@search", products::search)?
        .register("Catalog.Products@show", products::show)?
        .register("Catalog.Products@create", products::create)?
        .register("Catalog.Products@update", products::update)?
        .register("Catalog.Products@delete", products::delete)?
        .register("Catalog.Products@category_products", products::category_products)?
        .register("Catalog.Categories@index", categories::index)?
        .register("Catalog.Brands@index", brands::index)?
        .register("Catalog.Brands@products", brands::products)?
        .register("Diagnostics.Test@public", diagnostics::public)?
        .register("Diagnostics.Test@echo", diagnostics::echo)?;
    Ok(())
}

/// Registry with every shipped handler.
pub fn registry() -> Result<HandlerRegistry, ConfigError> {
    let mut registry = HandlerRegistry::new();
    register(&mut registry)?;
    Ok(registry)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_routes;
    use crate::routing::RouteTable;

    #[test]
    fn default_table_fully_resolves() {
        let table = RouteTable::compile(&default_routes()).unwrap();
        let registry = registry().unwrap();
        assert!(registry.unresolved(&table).is_empty());
        assert_eq!(registry.len(), 12);
    }
}
