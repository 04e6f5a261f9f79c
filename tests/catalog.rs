mod common;

use common::{create_user, create_variant, ledger, money};
use inventory_api::entities::stock_transaction::MovementKind;
use inventory_api::ledger::{
    LedgerError, LineItemInput, NewProduct, NewVariant, ProductPatch, VariantPatch,
};

#[tokio::test]
async fn variant_requires_an_existing_product() {
    let ledger = ledger().await;

    let err = ledger
        .catalog()
        .create_variant(
            12,
            NewVariant {
                price: money("1.00"),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { id: 12, .. }));

    let err = ledger
        .catalog()
        .list_variants_by_product(12)
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
}

#[tokio::test]
async fn product_name_is_required() {
    let ledger = ledger().await;
    let catalog = ledger.catalog();

    let err = catalog
        .create_product(NewProduct {
            name: "   ".into(),
            ..Default::default()
        })
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidProduct(_)));

    let product = catalog
        .create_product(NewProduct {
            name: "Mug".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let err = catalog
        .update_product(
            product.id,
            ProductPatch {
                name: Some(String::new()),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidProduct(_)));

    let renamed = catalog
        .update_product(
            product.id,
            ProductPatch {
                category: Some("kitchen".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(renamed.name, "Mug");
    assert_eq!(renamed.category, "kitchen");
}

#[tokio::test]
async fn initial_stock_is_recorded_as_a_movement() {
    let ledger = ledger().await;
    let catalog = ledger.catalog();
    let product = catalog
        .create_product(NewProduct {
            name: "Hoodie".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let variant = catalog
        .create_variant(
            product.id,
            NewVariant {
                color: "grey".into(),
                size: "L".into(),
                price: money("39.90"),
                initial_stock: 15,
            },
        )
        .await
        .unwrap();
    assert_eq!(variant.stock, 15);

    let movements = ledger.stock().list_movements(Some(variant.id)).await.unwrap();
    assert_eq!(movements.len(), 1);
    assert_eq!(movements[0].qty, 15);
    assert_eq!(ledger.stock().verify_stock(variant.id).await.unwrap(), 15);

    let listed = catalog.list_variants_by_product(product.id).await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].id, variant.id);
}

#[tokio::test]
async fn negative_price_is_rejected() {
    let ledger = ledger().await;
    let catalog = ledger.catalog();
    let product = catalog
        .create_product(NewProduct {
            name: "Cap".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let err = catalog
        .create_variant(
            product.id,
            NewVariant {
                price: money("-0.01"),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidPrice));
}

#[tokio::test]
async fn stock_edits_go_through_the_ledger() {
    let ledger = ledger().await;
    let catalog = ledger.catalog();
    let product = catalog
        .create_product(NewProduct {
            name: "Scarf".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let variant = catalog
        .create_variant(
            product.id,
            NewVariant {
                price: money("15.00"),
                initial_stock: 8,
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let updated = catalog
        .update_variant(
            variant.id,
            VariantPatch {
                color: Some("red".into()),
                stock: Some(3),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

    assert_eq!(updated.color, "red");
    assert_eq!(updated.stock, 3);
    assert_eq!(ledger.stock().list_movements(Some(variant.id)).await.unwrap().len(), 2);
    assert_eq!(ledger.stock().verify_stock(variant.id).await.unwrap(), 3);
}

#[tokio::test]
async fn price_above_the_column_range_is_rejected() {
    let ledger = ledger().await;
    let catalog = ledger.catalog();
    let product = catalog
        .create_product(NewProduct {
            name: "Watch".into(),
            ..Default::default()
        })
        .await
        .unwrap();

    let err = catalog
        .create_variant(
            product.id,
            NewVariant {
                price: money("50000000000000000000000000000"),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidPrice));

    let variant = catalog
        .create_variant(
            product.id,
            NewVariant {
                price: money("99999999.99"),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = catalog
        .update_variant(
            variant.id,
            VariantPatch {
                price: Some(money("100000000.00")),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap_err();
    assert!(matches!(err, LedgerError::InvalidPrice));
}

#[tokio::test]
async fn product_with_variants_cannot_be_deleted() {
    let ledger = ledger().await;
    let catalog = ledger.catalog();
    let product = catalog
        .create_product(NewProduct {
            name: "Belt".into(),
            ..Default::default()
        })
        .await
        .unwrap();
    let variant = catalog
        .create_variant(
            product.id,
            NewVariant {
                price: money("12.00"),
                ..Default::default()
            },
        )
        .await
        .unwrap();

    let err = catalog.delete_product(product.id).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::StillReferenced {
            referenced_by: "product variants",
            ..
        }
    ));

    catalog.delete_variant(variant.id).await.unwrap();
    catalog.delete_product(product.id).await.unwrap();

    let err = catalog.get_product(product.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
    let err = catalog.delete_product(product.id).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
}

#[tokio::test]
async fn variant_with_history_cannot_be_deleted() {
    let ledger = ledger().await;
    let catalog = ledger.catalog();

    let stocked = create_variant(&ledger, "3.00", 5).await;
    let err = catalog.delete_variant(stocked).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::StillReferenced {
            referenced_by: "stock transactions",
            ..
        }
    ));

    let sold = create_variant(&ledger, "3.00", 0).await;
    let user_id = create_user(&ledger, "cashier").await;
    ledger
        .sales()
        .open_sale_with_items(
            user_id,
            &[LineItemInput {
                product_variant_id: sold,
                qty: 1,
            }],
        )
        .await
        .unwrap();
    let err = catalog.delete_variant(sold).await.unwrap_err();
    assert!(matches!(
        err,
        LedgerError::StillReferenced {
            referenced_by: "sales records",
            ..
        }
    ));

    assert_eq!(
        ledger
            .stock()
            .list_movements(Some(stocked))
            .await
            .unwrap()
            .len(),
        1
    );
    assert_eq!(
        ledger.stock().list_movements(Some(stocked)).await.unwrap()[0].kind,
        MovementKind::In
    );
    let err = catalog.delete_variant(9999).await.unwrap_err();
    assert!(matches!(err, LedgerError::NotFound { .. }));
}
