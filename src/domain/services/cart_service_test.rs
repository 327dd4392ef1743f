#[cfg(test)]
mod tests {
    use crate::domain::services::test_support::TestContext;
    use crate::domain::services::ServiceError;
    use uuid::Uuid;

    #[tokio::test]
    async fn test_create_is_idempotent_and_requires_user() {
        let ctx = TestContext::new().await;
        let user = ctx.user("cart@example.com").await;

        let first = ctx.carts.create(user.id).await.unwrap();
        let second = ctx.carts.create(user.id).await.unwrap();
        assert_eq!(first.id, second.id);

        let missing = Uuid::new_v4();
        let err = ctx.carts.create(missing).await.unwrap_err();
        assert_eq!(err.to_string(), format!("User {} not found", missing));
    }

    #[tokio::test]
    async fn test_add_item_merges_by_presentation() {
        let ctx = TestContext::new().await;
        let user = ctx.user("merge@example.com").await;
        let cart = ctx.carts.create(user.id).await.unwrap();
        let product = ctx.product("Aceite 20W50", "Bidón 4 Litros, Balde 20 Litros").await;

        ctx.carts.add_item(cart.id, product.id, 1, Some("Bidón 4 Litros")).await.unwrap();
        ctx.carts.add_item(cart.id, product.id, 2, Some("bidón 4 litros")).await.unwrap();
        let cart = ctx.carts.add_item(cart.id, product.id, 1, Some("Balde 20 Litros")).await.unwrap();

        assert_eq!(cart.items.len(), 2);
        let bidon = cart
            .items
            .iter()
            .find(|i| i.presentation.as_deref() == Some("Bidón 4 Litros"))
            .unwrap();
        assert_eq!(bidon.quantity, 3);
        assert_eq!(bidon.product.as_ref().map(|p| p.id), Some(product.id));

        let by_user = ctx.carts.get_by_user(user.id).await.unwrap();
        assert_eq!(by_user.id, cart.id);
    }

    #[tokio::test]
    async fn test_add_item_checks_cart_product_then_quantity() {
        let ctx = TestContext::new().await;
        let user = ctx.user("checks@example.com").await;
        let cart = ctx.carts.create(user.id).await.unwrap();
        let product = ctx.product("Grasa", "Pote 1 Kg").await;

        let err = ctx.carts.add_item(9999, 9999, 0, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Cart 9999 not found");

        let err = ctx.carts.add_item(cart.id, 9999, 0, None).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));

        let err = ctx.carts.add_item(cart.id, product.id, 0, None).await.unwrap_err();
        assert_eq!(err.to_string(), "Quantity must be at least 1");

        let err = ctx
            .carts
            .add_item(cart.id, product.id, 1, Some("Tambor 200 Litros"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Invalid presentation \"Tambor 200 Litros\" for product {}", product.id)
        );
    }

    #[tokio::test]
    async fn test_delete_item_decrements_then_removes() {
        let ctx = TestContext::new().await;
        let user = ctx.user("delete@example.com").await;
        let cart = ctx.carts.create(user.id).await.unwrap();
        let product = ctx.product("Refrigerante", "Bidón 5 Litros").await;
        ctx.carts.add_item(cart.id, product.id, 3, Some("Bidón 5 Litros")).await.unwrap();

        let updated = ctx
            .carts
            .delete_item(cart.id, product.id, 1, Some("BIDÓN 5 LITROS"))
            .await
            .unwrap();
        assert_eq!(updated.items[0].quantity, 2);

        let updated = ctx
            .carts
            .delete_item(cart.id, product.id, 5, Some("Bidón 5 Litros"))
            .await
            .unwrap();
        assert!(updated.items.is_empty());

        let err = ctx
            .carts
            .delete_item(cart.id, product.id, 1, Some("Bidón 5 Litros"))
            .await
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            format!("Cart {} does not contain item {}", cart.id, product.id)
        );
    }

    #[tokio::test]
    async fn test_empty_clears_items() {
        let ctx = TestContext::new().await;
        let user = ctx.user("empty@example.com").await;
        let cart = ctx.carts.create(user.id).await.unwrap();
        let a = ctx.product("A", "").await;
        let b = ctx.product("B", "").await;
        ctx.carts.add_item(cart.id, a.id, 1, None).await.unwrap();
        ctx.carts.add_item(cart.id, b.id, 1, None).await.unwrap();

        let cart = ctx.carts.empty(cart.id).await.unwrap();
        assert!(cart.items.is_empty());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_adds_keep_a_single_line() {
        let dir = tempfile::tempdir().unwrap();
        let ctx = TestContext::file_backed(dir.path()).await;
        let user = ctx.user("concurrent@example.com").await;
        let cart = ctx.carts.create(user.id).await.unwrap();
        let product = ctx.product("Aceite 15W40", "Balde 20 Litros, Bidón 4 Litros").await;
        let (cart_id, product_id) = (cart.id, product.id);

        for round in 1..=5 {
            let adds: Vec<_> = (0..8)
                .map(|_| {
                    let carts = ctx.carts.clone();
                    tokio::spawn(async move {
                        carts
                            .add_item(cart_id, product_id, 1, Some("balde 20 litros"))
                            .await
                    })
                })
                .collect();
            for add in adds {
                add.await.unwrap().unwrap();
            }

            let cart = ctx.carts.get(cart_id).await.unwrap();
            assert_eq!(cart.items.len(), 1);
            assert_eq!(cart.items[0].quantity, 8 * round);
            assert_eq!(cart.items[0].presentation.as_deref(), Some("Balde 20 Litros"));
        }
    }

    #[tokio::test]
    async fn test_items_without_presentation_merge() {
        let ctx = TestContext::new().await;
        let user = ctx.user("plain@example.com").await;
        let cart = ctx.carts.create(user.id).await.unwrap();
        let product = ctx.product("Grasa", "Pote 1 Kg").await;

        ctx.carts.add_item(cart.id, product.id, 2, None).await.unwrap();
        let cart = ctx.carts.add_item(cart.id, product.id, 3, Some("  ")).await.unwrap();

        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.items[0].presentation, None);
    }
}
