//! # Seed Menu
//!
//! The cafeteria's starting menu, used by the scripted session and tests.
//!
//! ```text
//! Desayuno   arroz_con_huevo   10000
//! Bebidas    cafe               3000   sizes: pequeno (+0), grande (+1000)
//!                                      extras: vaso (+200, mandatory),
//!                                              leche_almendra (+1500)
//!            chocolate          6000   extras: malvaviscos (+800)
//! Panaderia  croissant          4000
//! Comida     galletas           3000
//! ```

use cafeteria_core::{
    Availability, Catalog, Category, ExtraOption, Money, Product, SizeOption,
};

fn category(id: &str, name: &str, position: i32) -> Category {
    Category {
        id: id.to_string(),
        name: name.to_string(),
        position,
    }
}

fn product(id: &str, name: &str, description: &str, price: i64, category_id: &str) -> Product {
    Product {
        id: id.to_string(),
        name: name.to_string(),
        description: Some(description.to_string()),
        base_price: Money::from_major(price),
        category_id: category_id.to_string(),
        availability: Availability::Available,
        allergens: None,
        sizes: Vec::new(),
        extras: Vec::new(),
    }
}

fn size(product_id: &str, id: &str, name: &str, delta: i64) -> SizeOption {
    SizeOption {
        id: format!("{product_id}_{id}"),
        product_id: product_id.to_string(),
        name: name.to_string(),
        price_delta: Money::from_major(delta),
    }
}

fn extra(product_id: &str, id: &str, name: &str, price: i64, mandatory: bool) -> ExtraOption {
    ExtraOption {
        id: format!("{product_id}_{id}"),
        product_id: product_id.to_string(),
        name: name.to_string(),
        price: Money::from_major(price),
        mandatory,
    }
}

/// Builds the starting menu.
pub fn seed_catalog() -> Catalog {
    let categories = vec![
        category("desayuno", "Desayuno", 0),
        category("bebidas", "Bebidas", 1),
        category("panaderia", "Panaderia", 2),
        category("comida", "Comida", 3),
    ];

    let arroz = Product {
        allergens: Some("huevo".to_string()),
        ..product(
            "arroz_con_huevo",
            "Arroz con huevo",
            "Arroz blanco con huevo frito",
            10000,
            "desayuno",
        )
    };

    let cafe = Product {
        sizes: vec![
            size("cafe", "pequeno", "Pequeno", 0),
            size("cafe", "grande", "Grande", 1000),
        ],
        extras: vec![
            extra("cafe", "vaso", "Vaso para llevar", 200, true),
            extra("cafe", "leche_almendra", "Leche de almendra", 1500, false),
        ],
        ..product("cafe", "Cafe", "Cafe de origen", 3000, "bebidas")
    };

    let chocolate = Product {
        allergens: Some("leche".to_string()),
        extras: vec![extra("chocolate", "malvaviscos", "Malvaviscos", 800, false)],
        ..product("chocolate", "Chocolate", "Chocolate caliente", 6000, "bebidas")
    };

    let croissant = Product {
        allergens: Some("gluten, leche".to_string()),
        ..product("croissant", "Croissant", "Croissant de mantequilla", 4000, "panaderia")
    };

    let galletas = Product {
        allergens: Some("gluten".to_string()),
        ..product("galletas", "Galletas", "Galletas de avena", 3000, "comida")
    };

    Catalog::new(categories, vec![arroz, cafe, chocolate, croissant, galletas])
}
