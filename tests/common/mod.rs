#![allow(dead_code)]

use finbot::application::admin::AdminConsole;
use finbot::application::bot::Bot;
use finbot::application::wizard::OperationWizard;
use finbot::domain::catalog::{Account, Catalog, Organisation, Project};
use finbot::domain::operation::PaymentDefaults;
use finbot::domain::user::UserId;
use finbot::infrastructure::in_memory::{
    InMemoryFinanceApi, InMemoryOperationLog, InMemoryUserStore,
};
use std::collections::HashSet;
use std::sync::Arc;

pub const ADMIN_ID: UserId = 1;
pub const USER_ID: UserId = 42;
pub const API_KEY: &str = "key-42";

pub fn catalog() -> Catalog {
    Catalog {
        projects: vec![Project {
            id: 1,
            project_name: Some("Warehouse".to_owned()),
        }],
        organisations: vec![
            Organisation {
                id: 10,
                organisation_name: Some("Acme LLC".to_owned()),
                name: None,
            },
            Organisation {
                id: 20,
                organisation_name: None,
                name: Some("Globex".to_owned()),
            },
        ],
        accounts: vec![
            account(100, "Main", "40702810000000001234", 10),
            account(200, "Globex main", "40702810000000009999", 20),
        ],
        fact_streams: vec![],
    }
}

pub fn account(id: i64, name: &str, number: &str, organisation_id: i64) -> Account {
    Account {
        id,
        account_name: Some(name.to_owned()),
        number: Some(number.to_owned()),
        organisation_id: Some(organisation_id),
    }
}

/// A bot wired to in-memory adapters, plus handles to inspect them.
pub struct Harness {
    pub bot: Bot,
    pub api: InMemoryFinanceApi,
    pub users: InMemoryUserStore,
    pub log: InMemoryOperationLog,
}

pub fn harness(catalog: Catalog) -> Harness {
    let api = InMemoryFinanceApi::new(catalog).accepting([API_KEY]);
    let users = InMemoryUserStore::new();
    let log = InMemoryOperationLog::new();

    let wizard = OperationWizard::new(
        Arc::new(api.clone()),
        Arc::new(users.clone()),
        Arc::new(log.clone()),
        PaymentDefaults::default(),
    );
    let admin = AdminConsole::new(
        Arc::new(users.clone()),
        Arc::new(log.clone()),
        HashSet::from([ADMIN_ID]),
    );

    Harness {
        bot: Bot::new(wizard, admin),
        api,
        users,
        log,
    }
}
