//! Shared test utilities for fix-db unit tests.

pub(crate) mod helpers {
    use fix_core::enums::UserRole;

    use crate::FixDb;
    use crate::service::FixService;
    use crate::updates::ticket::NewTicket;

    /// Create an in-memory service for pure store tests.
    pub async fn test_service() -> FixService {
        let db = FixDb::open_local(":memory:").await.unwrap();
        FixService::from_db(db)
    }

    /// Ids of the four seeded role accounts.
    pub struct SeededUsers {
        pub admin: i64,
        pub operator: i64,
        pub master: i64,
        pub manager: i64,
    }

    /// Seed one active user per role: admin, operator, master, manager.
    pub async fn seed_users(svc: &FixService) -> SeededUsers {
        let admin = svc
            .create_user("admin", UserRole::Admin, "Administrator")
            .await
            .unwrap();
        let operator = svc
            .create_user("operator", UserRole::Operator, "Operator")
            .await
            .unwrap();
        let master = svc
            .create_user("master", UserRole::Master, "Lead Technician")
            .await
            .unwrap();
        let manager = svc
            .create_user("manager", UserRole::Manager, "Quality Manager")
            .await
            .unwrap();
        SeededUsers {
            admin: admin.id,
            operator: operator.id,
            master: master.id,
            manager: manager.id,
        }
    }

    /// Standard ticket payload used across tests. Unassigned by default.
    pub fn fridge_ticket() -> NewTicket {
        NewTicket {
            appliance_type: "Fridge".into(),
            appliance_model: "LG".into(),
            issue_type: Some("Electric".into()),
            problem_description: "Compressor never stops".into(),
            client_name: "Jane Doe".into(),
            client_phone: "89991234567".into(),
            technician_username: None,
        }
    }
}
