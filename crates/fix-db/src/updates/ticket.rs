//! Ticket creation payload and partial-update builder.

use fix_core::enums::TicketStatus;

/// Validated input for `create_ticket`.
///
/// The caller (web/CLI layer) has already parsed and validated field formats;
/// the store only applies its own domain rules (upserts, technician
/// resolution, request-number allocation).
#[derive(Debug, Clone)]
pub struct NewTicket {
    pub appliance_type: String,
    pub appliance_model: String,
    /// `None`, empty, or the sentinel `"unspecified"` all mean no issue type.
    pub issue_type: Option<String>,
    pub problem_description: String,
    pub client_name: String,
    pub client_phone: String,
    /// Username of the primary technician. Absent or unresolvable leaves the
    /// ticket unassigned (not an error).
    pub technician_username: Option<String>,
}

/// Partial update for `update_ticket`. `None` fields are left untouched.
///
/// Technician semantics: only a non-empty, resolvable username performs
/// reassignment. An empty or whitespace-only string means "no change
/// requested" — there is no clear-assignment operation on this path.
#[derive(Debug, Clone, Default)]
pub struct TicketUpdate {
    pub appliance_type: Option<String>,
    pub appliance_model: Option<String>,
    /// `Some("")` or `Some("unspecified")` clears the reference to NULL.
    pub issue_type: Option<String>,
    pub problem_description: Option<String>,
    pub client_name: Option<String>,
    pub client_phone: Option<String>,
    pub technician_username: Option<String>,
    pub status: Option<TicketStatus>,
}

pub struct TicketUpdateBuilder(TicketUpdate);

impl TicketUpdateBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self(TicketUpdate::default())
    }

    #[must_use]
    pub fn appliance_type(mut self, kind: impl Into<String>) -> Self {
        self.0.appliance_type = Some(kind.into());
        self
    }

    #[must_use]
    pub fn appliance_model(mut self, model: impl Into<String>) -> Self {
        self.0.appliance_model = Some(model.into());
        self
    }

    #[must_use]
    pub fn issue_type(mut self, name: impl Into<String>) -> Self {
        self.0.issue_type = Some(name.into());
        self
    }

    #[must_use]
    pub fn problem_description(mut self, description: impl Into<String>) -> Self {
        self.0.problem_description = Some(description.into());
        self
    }

    #[must_use]
    pub fn client_name(mut self, name: impl Into<String>) -> Self {
        self.0.client_name = Some(name.into());
        self
    }

    #[must_use]
    pub fn client_phone(mut self, phone: impl Into<String>) -> Self {
        self.0.client_phone = Some(phone.into());
        self
    }

    #[must_use]
    pub fn technician_username(mut self, username: impl Into<String>) -> Self {
        self.0.technician_username = Some(username.into());
        self
    }

    #[must_use]
    pub fn status(mut self, status: TicketStatus) -> Self {
        self.0.status = Some(status);
        self
    }

    #[must_use]
    pub fn build(self) -> TicketUpdate {
        self.0
    }
}

impl Default for TicketUpdateBuilder {
    fn default() -> Self {
        Self::new()
    }
}
