use diesel::prelude::*;
use std::str::FromStr;

use fund_core::errors::Error;
use fund_core::managers::Manager;
use fund_core::portfolio::holdings::RiskBucket;

#[derive(Queryable, Selectable, Insertable, Debug, Clone, PartialEq)]
#[diesel(table_name = crate::schema::managers)]
#[diesel(check_for_backend(diesel::sqlite::Sqlite))]
pub struct ManagerDB {
    pub manager_id: String,
    pub risk_type: String,
    pub name: String,
}

impl TryFrom<ManagerDB> for Manager {
    type Error = Error;

    fn try_from(db: ManagerDB) -> Result<Self, Self::Error> {
        Ok(Manager {
            manager_id: db.manager_id,
            risk_bucket: RiskBucket::from_str(&db.risk_type)?,
            name: db.name,
        })
    }
}

impl From<&Manager> for ManagerDB {
    fn from(manager: &Manager) -> Self {
        ManagerDB {
            manager_id: manager.manager_id.clone(),
            risk_type: manager.risk_bucket.as_str().to_string(),
            name: manager.name.clone(),
        }
    }
}
