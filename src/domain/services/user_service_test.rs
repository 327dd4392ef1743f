#[cfg(test)]
mod tests {
    use crate::domain::models::user::{CreateUserDto, LoginDto, UpdateUserDto, UserRole};
    use crate::domain::repositories::cart_repository::CartRepository;
    use crate::domain::repositories::user_repository::MockUserRepository;
    use crate::domain::services::auth_service::verify_password;
    use crate::domain::services::test_support::TestContext;
    use crate::domain::services::user_service::{normalize_email, UserService};
    use crate::domain::services::ServiceError;
    use crate::infrastructure::repositories::cart_repo_impl::CartRepositoryImpl;
    use std::sync::Arc;
    use uuid::Uuid;

    fn register(email: &str) -> CreateUserDto {
        CreateUserDto {
            email: email.to_string(),
            password: "secreto123".to_string(),
            nombre: "Lucía".to_string(),
            apellido: "Fernández".to_string(),
            direccion: None,
            telefono: "11-2222-3333".to_string(),
            rol: None,
        }
    }

    #[test]
    fn test_normalize_email() {
        assert_eq!(normalize_email("  Ana@Example.COM "), "ana@example.com");
    }

    #[tokio::test]
    async fn test_create_normalizes_email_hashes_password_and_opens_cart() {
        let ctx = TestContext::new().await;
        let user = ctx.users.create(register(" Lucia@Example.com ")).await.unwrap();

        assert_eq!(user.email, "lucia@example.com");
        assert_eq!(user.rol, UserRole::ClienteMinorista);
        assert_ne!(user.password, "secreto123");
        assert!(verify_password(&user.password, "secreto123"));

        let carts = CartRepositoryImpl::new(ctx.db.clone());
        assert!(carts.find_by_user(user.id).await.unwrap().is_some());
    }

    #[tokio::test]
    async fn test_create_validates_in_order() {
        let ctx = TestContext::new().await;

        let mut dto = register("not-an-email");
        dto.password = "short".to_string();
        let err = ctx.users.create(dto).await.unwrap_err();
        assert_eq!(err.to_string(), "Email is not valid");

        let mut dto = register("a@example.com");
        dto.password = "short".to_string();
        let err = ctx.users.create(dto).await.unwrap_err();
        assert_eq!(err.to_string(), "Password is too short");

        let mut dto = register("a@example.com");
        dto.nombre = "L".to_string();
        let err = ctx.users.create(dto).await.unwrap_err();
        assert_eq!(err.to_string(), "Nombre is too short");

        ctx.users.create(register("a@example.com")).await.unwrap();
        let err = ctx.users.create(register("A@example.com")).await.unwrap_err();
        assert!(matches!(err, ServiceError::Conflict(_)));
        assert_eq!(err.to_string(), "User with this email already exists");
    }

    #[tokio::test]
    async fn test_update_rejects_email_of_another_user() {
        let ctx = TestContext::new().await;
        let first = ctx.users.create(register("first@example.com")).await.unwrap();
        ctx.users.create(register("second@example.com")).await.unwrap();

        let err = ctx
            .users
            .update(
                first.id,
                UpdateUserDto {
                    email: Some("second@example.com".to_string()),
                    ..Default::default()
                },
            )
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "Email already in use");

        let updated = ctx
            .users
            .update(
                first.id,
                UpdateUserDto {
                    nombre: Some("Lu".to_string()),
                    rol: Some(UserRole::ClienteMayorista),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.nombre, "Lu");
        assert_eq!(updated.rol, UserRole::ClienteMayorista);
        assert_eq!(updated.email, "first@example.com");
    }

    #[tokio::test]
    async fn test_login_issues_verifiable_token() {
        let ctx = TestContext::new().await;
        let user = ctx.users.create(register("login@example.com")).await.unwrap();

        let response = ctx
            .users
            .login(LoginDto {
                email: "LOGIN@example.com".to_string(),
                password: "secreto123".to_string(),
            })
            .await
            .unwrap();
        let claims = ctx.auth.verify_token(&response.token).unwrap();
        assert_eq!(claims.id, user.id);
        assert_eq!(claims.email, "login@example.com");

        let err = ctx
            .users
            .login(LoginDto {
                email: "login@example.com".to_string(),
                password: "incorrecta".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::Unauthorized(_)));
        assert_eq!(err.to_string(), "Credenciales inválidas");
    }

    #[tokio::test]
    async fn test_find_one_missing_user() {
        let ctx = TestContext::new().await;
        let mut users = MockUserRepository::new();
        users.expect_find_by_id().returning(|_| Ok(None));

        let service = UserService::new(
            Arc::new(users),
            Arc::new(CartRepositoryImpl::new(ctx.db.clone())),
            ctx.auth.clone(),
        );
        let err = service.find_one(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
        assert_eq!(err.to_string(), "User not found");

        let err = service.remove(Uuid::new_v4()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotFound(_)));
    }
}
