use chrono::NaiveDate;
use pushkind_common::repository::errors::RepositoryError;
use product_catalog::domain::category::NewCategory;
use product_catalog::domain::product::{NewProduct, UpdateProduct};
use product_catalog::repository::DieselRepository;
use product_catalog::repository::{CategoryReader, CategoryWriter, ProductReader, ProductWriter};

mod common;

fn date(year: i32, month: u32, day: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(year, month, day).expect("valid date")
}

#[test]
fn test_category_repository_lookup_by_name() {
    let test_db = common::TestDb::new("test_category_repository_lookup_by_name.db");
    let repo = DieselRepository::new(test_db.pool());

    let apparel = repo
        .create_category(&NewCategory::new("Apparel"))
        .expect("create category");
    repo.create_category(&NewCategory::new("Food"))
        .expect("create category");

    let found = repo
        .get_category_by_name("Apparel")
        .expect("lookup")
        .expect("category exists");
    assert_eq!(found.id, apparel.id);

    assert!(repo.get_category_by_name("apparel").unwrap().is_none());
    assert!(repo.get_category_by_name("Toys").unwrap().is_none());
}

#[test]
fn test_product_repository_crud() {
    let test_db = common::TestDb::new("test_product_repository_crud.db");
    let repo = DieselRepository::new(test_db.pool());

    let apparel = repo.create_category(&NewCategory::new("Apparel")).unwrap();
    let outerwear = repo.create_category(&NewCategory::new("Outerwear")).unwrap();

    let shirt = repo
        .create_product(
            &NewProduct::new(
                "Shirt",
                "Cotton",
                50000.0,
                apparel.id,
                date(2025, 12, 31),
                "admin@example.com",
            )
            .with_image("products/shirt.png"),
        )
        .unwrap();
    let hat = repo
        .create_product(&NewProduct::new(
            "Hat",
            "Wool",
            15000.0,
            apparel.id,
            date(2026, 1, 15),
            "admin@example.com",
        ))
        .unwrap();

    assert!(hat.id > shirt.id);
    assert_eq!(shirt.image.as_deref(), Some("products/shirt.png"));
    assert!(hat.image.is_none());

    let items = repo.list_products().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].name, "Shirt");
    assert_eq!(items[1].name, "Hat");

    let by_name = repo.get_product_by_name("Hat").unwrap().expect("hat exists");
    assert_eq!(by_name.id, hat.id);

    let updated = repo
        .update_product(
            shirt.id,
            &UpdateProduct::new(
                "Jacket",
                "Leather",
                250000.0,
                outerwear.id,
                date(2027, 6, 1),
                "editor@example.com",
            ),
        )
        .unwrap();
    assert_eq!(updated.name, "Jacket");
    assert_eq!(updated.price, 250000.0);
    assert_eq!(updated.category_id, outerwear.id);
    assert_eq!(updated.expired_at, date(2027, 6, 1));
    assert_eq!(updated.modified_by, "editor@example.com");
    assert_eq!(
        updated.image.as_deref(),
        Some("products/shirt.png"),
        "image is kept when no new file is given"
    );

    let reloaded = repo
        .update_product(
            shirt.id,
            &UpdateProduct::new(
                "Jacket",
                "Leather",
                250000.0,
                outerwear.id,
                date(2027, 6, 1),
                "editor@example.com",
            )
            .with_image("products/jacket.png"),
        )
        .unwrap();
    assert_eq!(reloaded.image.as_deref(), Some("products/jacket.png"));

    repo.delete_product(hat.id).unwrap();
    assert!(repo.get_product_by_id(hat.id).unwrap().is_none());

    let err = repo
        .delete_product(hat.id)
        .expect_err("expected second delete to fail");
    assert!(matches!(err, RepositoryError::NotFound));

    let err = repo
        .update_product(
            hat.id,
            &UpdateProduct::new(
                "Ghost",
                "Gone",
                1.0,
                apparel.id,
                date(2025, 1, 1),
                "editor@example.com",
            ),
        )
        .expect_err("expected update of deleted product to fail");
    assert!(matches!(err, RepositoryError::NotFound));

    let remaining = repo.list_products().unwrap();
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].name, "Jacket");
}
