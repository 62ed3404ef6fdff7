//! The salon engine: appointment scheduling, conflict detection, the finance
//! ledger and the surrounding catalog/inventory/client stores.
//!
//! All collections live in memory and are persisted as whole-collection JSON
//! snapshots through the [`Storage`] contract. Every mutating operation
//! writes the updated snapshot first and only then commits the change to
//! memory, so a failed write leaves the engine exactly as it was.

use chrono::{NaiveDate, Utc};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::collections::BTreeMap;
use uuid::Uuid;

pub use appointments::{Appointment, AppointmentDraft, AppointmentStatus};
pub use clients::{Client, ClientDraft, Visit, VisitDraft};
pub use error::EngineError;
pub use finance::{
    CATEGORY_SERVICE, FinanceDraft, FinanceRecord, FinanceTotals, Owner, RecordKind,
};
pub use interval::{ClockTime, DEFAULT_DURATION_MINUTES, TimeInterval};
pub use materials::{Material, MaterialDraft, Purchase};
pub use money::Money;
pub use reports::{ClientsReport, FinanceReport, ReportPeriod};
pub use schedule::{Slot, SlotStatus, WorkingHours};
pub use services::{Service, ServiceDraft, ServiceUpdate};
pub use storage::{FileStorage, MemoryStorage, Storage, StorageError, keys};
pub use users::{User, UserRole};

mod appointments;
mod clients;
mod error;
mod finance;
mod interval;
mod materials;
mod money;
mod reports;
mod schedule;
mod services;
mod storage;
mod users;

type ResultEngine<T> = Result<T, EngineError>;

/// Filter for [`Engine::appointments`]. Unset fields match everything.
#[derive(Clone, Debug, Default)]
pub struct AppointmentFilter {
    pub provider_id: Option<String>,
    pub date: Option<NaiveDate>,
    pub status: Option<AppointmentStatus>,
    /// Sort the result by start time for same-day display instead of
    /// insertion order.
    pub time_sorted: bool,
}

pub struct Engine {
    appointments: Vec<Appointment>,
    finances: Vec<FinanceRecord>,
    services: Vec<Service>,
    materials: Vec<Material>,
    clients: Vec<Client>,
    users: Vec<User>,
    working_hours: WorkingHours,
    storage: Box<dyn Storage>,
}

impl Engine {
    /// Return a builder for `Engine`. Help to build the struct.
    pub fn builder() -> EngineBuilder {
        EngineBuilder::default()
    }

    pub fn working_hours(&self) -> &WorkingHours {
        &self.working_hours
    }

    fn persist<T: Serialize>(&self, key: &str, records: &[T]) -> ResultEngine<()> {
        let payload = serde_json::to_string(records).map_err(StorageError::Encode)?;
        self.storage.save(key, &payload)?;
        Ok(())
    }

    // ---- appointments -----------------------------------------------------

    /// Lists appointments matching `filter`, in insertion order unless
    /// `time_sorted` is set.
    pub fn appointments(&self, filter: &AppointmentFilter) -> Vec<Appointment> {
        let mut result: Vec<Appointment> = self
            .appointments
            .iter()
            .filter(|a| {
                filter
                    .provider_id
                    .as_deref()
                    .is_none_or(|p| a.provider_id == p)
                    && filter.date.is_none_or(|d| a.date == d)
                    && filter.status.is_none_or(|s| a.status == s)
            })
            .cloned()
            .collect();

        if filter.time_sorted {
            result.sort_by_key(|a| (a.date, a.time));
        }
        result
    }

    pub fn appointment(&self, id: &str) -> ResultEngine<&Appointment> {
        self.appointments
            .iter()
            .find(|a| a.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))
    }

    /// Books a new appointment.
    ///
    /// The candidate interval is checked against every active booking of the
    /// same provider on the same date; any overlap rejects the whole create
    /// and leaves both memory and storage untouched. Adjacent bookings
    /// (touching endpoints) are accepted.
    pub fn create_appointment(&mut self, draft: AppointmentDraft) -> ResultEngine<Appointment> {
        let time = draft.parse_time()?;
        let duration_minutes = draft.duration()?;

        let candidate = time.interval(duration_minutes);
        if let Some(existing) =
            schedule::find_conflict(&self.appointments, &draft.provider_id, draft.date, candidate)
        {
            tracing::debug!(
                provider = %draft.provider_id,
                date = %draft.date,
                time = %time,
                "booking rejected, slot taken"
            );
            return Err(EngineError::SlotConflict(format!(
                "{} {} is already booked for {}",
                existing.date, existing.time, existing.provider_id
            )));
        }

        let now = Utc::now();
        let appointment = Appointment {
            id: Uuid::new_v4().to_string(),
            provider_id: draft.provider_id,
            provider_name: draft.provider_name,
            date: draft.date,
            time,
            duration_minutes,
            service_id: draft.service_id,
            service_name: draft.service_name,
            price: draft.price,
            client_name: draft.client_name,
            status: AppointmentStatus::Scheduled,
            finance_recorded: false,
            created_at: now,
            updated_at: now,
        };

        let mut updated = self.appointments.clone();
        updated.push(appointment.clone());
        self.persist(keys::APPOINTMENTS, &updated)?;
        self.appointments = updated;

        tracing::info!(id = %appointment.id, provider = %appointment.provider_id, "appointment booked");
        Ok(appointment)
    }

    /// Moves an appointment through its lifecycle.
    ///
    /// Completing an appointment synthesizes the linked income record once:
    /// the `finance_recorded` flag makes the side effect a no-op on any
    /// later replay of the snapshot.
    pub fn update_status(
        &mut self,
        id: &str,
        new_status: AppointmentStatus,
    ) -> ResultEngine<Appointment> {
        let index = self
            .appointments
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;

        let current = self.appointments[index].status;
        if !current.can_transition_to(new_status) {
            return Err(EngineError::IllegalTransition {
                from: current,
                to: new_status,
            });
        }

        let mut appointment = self.appointments[index].clone();
        appointment.status = new_status;
        appointment.updated_at = Utc::now();

        let mut updated_finances = None;
        if new_status == AppointmentStatus::Completed && !appointment.finance_recorded {
            let record = FinanceRecord::for_completed(&appointment, appointment.updated_at);
            appointment.finance_recorded = true;

            let mut finances = self.finances.clone();
            finances.push(record);
            updated_finances = Some(finances);
        }

        let mut appointments = self.appointments.clone();
        appointments[index] = appointment.clone();

        // Appointments first: once `finance_recorded` is durable, a replay
        // can never produce a second income record.
        self.persist(keys::APPOINTMENTS, &appointments)?;
        if let Some(finances) = &updated_finances {
            self.persist(keys::FINANCES, finances)?;
        }

        self.appointments = appointments;
        if let Some(finances) = updated_finances {
            self.finances = finances;
        }

        tracing::info!(id = %id, status = %new_status, "appointment status changed");
        Ok(appointment)
    }

    /// Removes an appointment outright. Finance records derived from it are
    /// kept; the ledger is history, not a view of the calendar.
    pub fn delete_appointment(&mut self, id: &str) -> ResultEngine<()> {
        let index = self
            .appointments
            .iter()
            .position(|a| a.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;

        let mut updated = self.appointments.clone();
        updated.remove(index);
        self.persist(keys::APPOINTMENTS, &updated)?;
        self.appointments = updated;
        Ok(())
    }

    /// Classifies the whole booking grid of `date` for `provider_id`.
    pub fn available_slots(
        &self,
        provider_id: &str,
        date: NaiveDate,
        duration_minutes: u32,
    ) -> ResultEngine<Vec<Slot>> {
        if duration_minutes == 0 {
            return Err(EngineError::InvalidAmount(
                "duration must be positive".to_string(),
            ));
        }
        Ok(schedule::classify_slots(
            &self.appointments,
            &self.working_hours,
            provider_id,
            date,
            duration_minutes,
        ))
    }

    // ---- finance ledger ---------------------------------------------------

    /// Appends a manually entered ledger record.
    pub fn add_finance_record(&mut self, draft: FinanceDraft) -> ResultEngine<FinanceRecord> {
        if !draft.amount.is_positive() {
            return Err(EngineError::InvalidAmount(
                "amount must be positive".to_string(),
            ));
        }

        let record = FinanceRecord {
            id: Uuid::new_v4().to_string(),
            kind: draft.kind,
            category: draft.category,
            amount: draft.amount,
            description: draft.description,
            date: draft.date,
            owner: draft.owner,
            created_by: draft.created_by,
            created_at: Utc::now(),
            appointment_id: None,
        };

        let mut updated = self.finances.clone();
        updated.push(record.clone());
        self.persist(keys::FINANCES, &updated)?;
        self.finances = updated;
        Ok(record)
    }

    /// Ledger rows visible to `provider_id` (shared rows plus their own),
    /// newest date first.
    pub fn finances_for(&self, provider_id: &str) -> Vec<FinanceRecord> {
        let mut visible: Vec<FinanceRecord> = self
            .finances
            .iter()
            .filter(|r| r.owner.visible_to(provider_id))
            .cloned()
            .collect();
        visible.sort_by(|a, b| b.date.cmp(&a.date));
        visible
    }

    pub fn finance_totals_for(&self, provider_id: &str) -> FinanceTotals {
        FinanceTotals::over(
            self.finances
                .iter()
                .filter(|r| r.owner.visible_to(provider_id)),
        )
    }

    // ---- service catalog --------------------------------------------------

    pub fn services(&self) -> &[Service] {
        &self.services
    }

    pub fn add_service(&mut self, draft: ServiceDraft) -> ResultEngine<Service> {
        if draft.duration_minutes == 0 {
            return Err(EngineError::InvalidAmount(
                "duration must be positive".to_string(),
            ));
        }

        let now = Utc::now();
        let service = Service {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            duration_minutes: draft.duration_minutes,
            price: draft.price,
            description: draft.description,
            created_at: now,
            updated_at: now,
        };

        let mut updated = self.services.clone();
        updated.push(service.clone());
        self.persist(keys::SERVICES, &updated)?;
        self.services = updated;
        Ok(service)
    }

    pub fn update_service(&mut self, id: &str, update: ServiceUpdate) -> ResultEngine<Service> {
        let index = self
            .services
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;

        let mut service = self.services[index].clone();
        if let Some(name) = update.name {
            service.name = name;
        }
        if let Some(minutes) = update.duration_minutes {
            if minutes == 0 {
                return Err(EngineError::InvalidAmount(
                    "duration must be positive".to_string(),
                ));
            }
            service.duration_minutes = minutes;
        }
        if let Some(price) = update.price {
            service.price = price;
        }
        if let Some(description) = update.description {
            service.description = description;
        }
        service.updated_at = Utc::now();

        let mut updated = self.services.clone();
        updated[index] = service.clone();
        self.persist(keys::SERVICES, &updated)?;
        self.services = updated;
        Ok(service)
    }

    pub fn delete_service(&mut self, id: &str) -> ResultEngine<()> {
        let index = self
            .services
            .iter()
            .position(|s| s.id == id)
            .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;

        let mut updated = self.services.clone();
        updated.remove(index);
        self.persist(keys::SERVICES, &updated)?;
        self.services = updated;
        Ok(())
    }

    // ---- materials --------------------------------------------------------

    /// Material rows visible to `provider_id`, purchase history included.
    pub fn materials_for(&self, provider_id: &str) -> Vec<Material> {
        self.materials
            .iter()
            .filter(|m| m.owner.visible_to(provider_id))
            .cloned()
            .collect()
    }

    pub fn add_material(&mut self, draft: MaterialDraft) -> ResultEngine<Material> {
        if draft.quantity < 0 {
            return Err(EngineError::InvalidAmount(
                "quantity must not be negative".to_string(),
            ));
        }

        let material = Material {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            owner: draft.owner,
            quantity: draft.quantity,
            unit: draft.unit,
            price: draft.price,
            is_purchase: false,
            purchase_date: None,
            created_at: Utc::now(),
        };

        let mut updated = self.materials.clone();
        updated.push(material.clone());
        self.persist(keys::MATERIALS, &updated)?;
        self.materials = updated;
        Ok(material)
    }

    /// Restocks a material: bumps the base row's quantity and appends a
    /// purchase-flagged history row, in one snapshot write.
    pub fn record_purchase(&mut self, material_id: &str, purchase: Purchase) -> ResultEngine<Material> {
        if purchase.quantity <= 0 {
            return Err(EngineError::InvalidAmount(
                "quantity must be positive".to_string(),
            ));
        }

        let index = self
            .materials
            .iter()
            .position(|m| m.id == material_id && !m.is_purchase)
            .ok_or_else(|| EngineError::KeyNotFound(material_id.to_string()))?;

        let mut updated = self.materials.clone();
        updated[index].quantity += purchase.quantity;

        let base = &updated[index];
        let history = Material {
            id: Uuid::new_v4().to_string(),
            name: base.name.clone(),
            owner: base.owner.clone(),
            quantity: purchase.quantity,
            unit: base.unit.clone(),
            price: purchase.price,
            is_purchase: true,
            purchase_date: Some(purchase.date),
            created_at: Utc::now(),
        };
        updated.push(history.clone());

        self.persist(keys::MATERIALS, &updated)?;
        self.materials = updated;
        Ok(history)
    }

    /// Takes `quantity` units out of stock.
    pub fn consume_material(&mut self, material_id: &str, quantity: i64) -> ResultEngine<Material> {
        if quantity <= 0 {
            return Err(EngineError::InvalidAmount(
                "quantity must be positive".to_string(),
            ));
        }

        let index = self
            .materials
            .iter()
            .position(|m| m.id == material_id && !m.is_purchase)
            .ok_or_else(|| EngineError::KeyNotFound(material_id.to_string()))?;

        if self.materials[index].quantity < quantity {
            return Err(EngineError::InsufficientStock(
                self.materials[index].name.clone(),
            ));
        }

        let mut updated = self.materials.clone();
        updated[index].quantity -= quantity;
        self.persist(keys::MATERIALS, &updated)?;
        self.materials = updated;
        Ok(self.materials[index].clone())
    }

    // ---- clients ----------------------------------------------------------

    pub fn clients(&self) -> &[Client] {
        &self.clients
    }

    pub fn add_client(&mut self, draft: ClientDraft) -> ResultEngine<Client> {
        let client = Client {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            phone: draft.phone,
            birthday: draft.birthday,
            notes: draft.notes,
            visits: Vec::new(),
            created_at: Utc::now(),
        };

        let mut updated = self.clients.clone();
        updated.push(client.clone());
        self.persist(keys::CLIENTS, &updated)?;
        self.clients = updated;
        Ok(client)
    }

    pub fn add_client_visit(&mut self, client_id: &str, draft: VisitDraft) -> ResultEngine<Visit> {
        let index = self
            .clients
            .iter()
            .position(|c| c.id == client_id)
            .ok_or_else(|| EngineError::KeyNotFound(client_id.to_string()))?;

        let visit = Visit {
            id: Uuid::new_v4().to_string(),
            date: draft.date,
            service_name: draft.service_name,
            price: draft.price,
            notes: draft.notes,
        };

        let mut updated = self.clients.clone();
        updated[index].visits.push(visit.clone());
        self.persist(keys::CLIENTS, &updated)?;
        self.clients = updated;
        Ok(visit)
    }

    // ---- users ------------------------------------------------------------

    pub fn users(&self) -> &[User] {
        &self.users
    }

    /// Plain username/password check against the stored accounts.
    pub fn verify_login(&self, username: &str, password: &str) -> Option<&User> {
        self.users
            .iter()
            .find(|u| u.username == username && u.password == password)
    }

    pub fn add_user(
        &mut self,
        username: String,
        password: String,
        name: String,
        role: UserRole,
    ) -> ResultEngine<User> {
        if self.users.iter().any(|u| u.username == username) {
            return Err(EngineError::ExistingKey(username));
        }

        let user = User {
            id: Uuid::new_v4().to_string(),
            username,
            password,
            name,
            role,
        };

        let mut updated = self.users.clone();
        updated.push(user.clone());
        self.persist(keys::USERS, &updated)?;
        self.users = updated;
        Ok(user)
    }

    // ---- reports ----------------------------------------------------------

    pub fn finance_report(&self, period: ReportPeriod) -> FinanceReport {
        reports::finance_report(&self.finances, &self.appointments, &self.materials, period)
    }

    pub fn clients_report(&self, period: ReportPeriod) -> ClientsReport {
        reports::clients_report(&self.clients, &self.appointments, period)
    }

    pub fn materials_report(&self, period: ReportPeriod) -> BTreeMap<String, Money> {
        reports::materials_report(&self.materials, period)
    }

    pub fn finance_csv(&self, period: ReportPeriod) -> ResultEngine<String> {
        reports::finance_csv(&self.finances, period)
    }
}

/// The builder for `Engine`
pub struct EngineBuilder {
    storage: Box<dyn Storage>,
    working_hours: WorkingHours,
}

impl Default for EngineBuilder {
    fn default() -> Self {
        Self {
            storage: Box::new(MemoryStorage::new()),
            working_hours: WorkingHours::default(),
        }
    }
}

impl EngineBuilder {
    /// Pass the storage backing the snapshots.
    pub fn storage(mut self, storage: impl Storage + 'static) -> EngineBuilder {
        self.storage = Box::new(storage);
        self
    }

    pub fn working_hours(mut self, hours: WorkingHours) -> EngineBuilder {
        self.working_hours = hours;
        self
    }

    /// Construct `Engine`, loading every collection's snapshot. Keys never
    /// written load as empty collections.
    pub fn build(self) -> Result<Engine, EngineError> {
        let appointments = load_collection(self.storage.as_ref(), keys::APPOINTMENTS)?;
        let finances = load_collection(self.storage.as_ref(), keys::FINANCES)?;
        let services = load_collection(self.storage.as_ref(), keys::SERVICES)?;
        let materials = load_collection(self.storage.as_ref(), keys::MATERIALS)?;
        let clients = load_collection(self.storage.as_ref(), keys::CLIENTS)?;
        let users = load_collection(self.storage.as_ref(), keys::USERS)?;

        Ok(Engine {
            appointments,
            finances,
            services,
            materials,
            clients,
            users,
            working_hours: self.working_hours,
            storage: self.storage,
        })
    }
}

fn load_collection<T: DeserializeOwned>(
    storage: &dyn Storage,
    key: &str,
) -> Result<Vec<T>, EngineError> {
    match storage.load(key)? {
        None => Ok(Vec::new()),
        Some(payload) => {
            serde_json::from_str(&payload).map_err(|source| {
                EngineError::Storage(StorageError::Corrupt {
                    key: key.to_string(),
                    source,
                })
            })
        }
    }
}
