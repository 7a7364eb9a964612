use std::sync::Arc;

use super::domain::{CompanyAdmin, CompanyId};
use super::repository::{CompanyDirectory, RepositoryError};

/// Answers whether a principal (identified by email) may act for a company,
/// from the company-scoped admin roster.
///
/// Roster membership and order-approval capability are independent booleans
/// on the same entry, so a company can carry read-only contacts. An email
/// that is not on the roster yields `false`, never an error. Email matching
/// is ASCII case-insensitive.
pub struct AdminGate<C> {
    companies: Arc<C>,
}

impl<C> AdminGate<C>
where
    C: CompanyDirectory,
{
    pub fn new(companies: Arc<C>) -> Self {
        Self { companies }
    }

    pub fn can_approve_orders(
        &self,
        admin_email: &str,
        company_id: &CompanyId,
    ) -> Result<bool, RepositoryError> {
        Ok(self
            .roster_entry(admin_email, company_id)?
            .map(|admin| admin.can_approve_orders)
            .unwrap_or(false))
    }

    pub fn is_company_admin(
        &self,
        admin_email: &str,
        company_id: &CompanyId,
    ) -> Result<bool, RepositoryError> {
        Ok(self.roster_entry(admin_email, company_id)?.is_some())
    }

    fn roster_entry(
        &self,
        admin_email: &str,
        company_id: &CompanyId,
    ) -> Result<Option<CompanyAdmin>, RepositoryError> {
        let Some(company) = self.companies.find(company_id)? else {
            return Ok(None);
        };

        Ok(company
            .admins
            .into_iter()
            .find(|admin| admin.email.eq_ignore_ascii_case(admin_email)))
    }
}
