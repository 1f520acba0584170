//! Multi-step sign-up wizard.
//!
//! The wizard is a linear step index whose length depends on the chosen
//! role: patients go through 4 steps, suppliers 5 and clinics 6. Step 1 is
//! always the role picker. Each call to [`RegistrationWizard::next`] validates
//! the step on screen; the last step yields the [`RegisterRequest`] to post to
//! `/api/auth/register`.
//!
//! Form state survives a page reload through [`RegistrationWizard::save`] and
//! [`RegistrationWizard::restore`], which round-trip the data as JSON under
//! [`STORAGE_KEY`].

use std::collections::BTreeMap;

use chrono::NaiveTime;
use serde::{Deserialize, Serialize};

use crate::model::clinic::OpeningHours;
use crate::requests::RegisterRequest;
use crate::validation::{is_strong_password, is_valid_email, is_valid_phone, PASSWORD_RULE};

/// Browser storage key holding the in-progress form.
pub const STORAGE_KEY: &str = "healthland_registration_data";

/// Length of the free trial offered to clinics, in days.
pub const CLINIC_TRIAL_DAYS: u32 = 14;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RegistrationRole {
    Patient,
    Clinic,
    Supplier,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    RoleSelection,
    PatientBasicInfo,
    PatientLocationPreferences,
    PatientTermsVerification,
    SupplierContact,
    SupplierAddress,
    SupplierCertifications,
    SupplierTerms,
    ClinicAdmin,
    ClinicLicensing,
    ClinicServices,
    ClinicHours,
    ClinicTerms,
}

const PATIENT_FLOW: &[Step] = &[
    Step::RoleSelection,
    Step::PatientBasicInfo,
    Step::PatientLocationPreferences,
    Step::PatientTermsVerification,
];

const SUPPLIER_FLOW: &[Step] = &[
    Step::RoleSelection,
    Step::SupplierContact,
    Step::SupplierAddress,
    Step::SupplierCertifications,
    Step::SupplierTerms,
];

const CLINIC_FLOW: &[Step] = &[
    Step::RoleSelection,
    Step::ClinicAdmin,
    Step::ClinicLicensing,
    Step::ClinicServices,
    Step::ClinicHours,
    Step::ClinicTerms,
];

fn flow(role: Option<RegistrationRole>) -> &'static [Step] {
    match role {
        Some(RegistrationRole::Patient) => PATIENT_FLOW,
        Some(RegistrationRole::Supplier) => SUPPLIER_FLOW,
        Some(RegistrationRole::Clinic) => CLINIC_FLOW,
        None => &PATIENT_FLOW[..1],
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

impl Default for Address {
    fn default() -> Self {
        Self {
            street: String::new(),
            city: String::new(),
            postal_code: String::new(),
            country: "Algeria".to_string(),
        }
    }
}

/// Every field of every flow. Only the ones of the selected role are read.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RegistrationData {
    pub role: Option<RegistrationRole>,

    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub password: String,
    pub confirm_password: String,
    pub phone: String,
    pub location: String,
    pub date_of_birth: String,
    pub agree_to_terms: bool,
    pub receive_newsletter: bool,
    #[serde(rename = "receiveSMS")]
    pub receive_sms: bool,

    pub company_name: String,
    pub contact_person: String,
    pub business_email: String,
    pub company_address: Address,
    pub drug_categories: Vec<String>,
    /// File names of uploaded certification documents.
    pub certifications: Vec<String>,
    pub website: String,
    pub linkedin_url: String,

    pub clinic_name: String,
    pub administrator_name: String,
    pub clinic_email: String,
    pub clinic_address: Address,
    pub license_number: String,
    pub license_document: Option<String>,
    pub services_offered: Vec<String>,
    pub accepted_insurance: Vec<String>,
    pub operating_hours: BTreeMap<String, OpeningHours>,
}

fn hours(open: &str, close: &str, is_open: bool) -> OpeningHours {
    OpeningHours {
        open: open.to_string(),
        close: close.to_string(),
        is_open,
    }
}

impl Default for RegistrationData {
    fn default() -> Self {
        let mut operating_hours = BTreeMap::new();
        for day in ["monday", "tuesday", "wednesday", "thursday", "friday"] {
            operating_hours.insert(day.to_string(), hours("09:00", "17:00", true));
        }
        operating_hours.insert("saturday".to_string(), hours("09:00", "13:00", true));
        operating_hours.insert("sunday".to_string(), hours("09:00", "13:00", false));

        Self {
            role: None,
            first_name: String::new(),
            last_name: String::new(),
            email: String::new(),
            password: String::new(),
            confirm_password: String::new(),
            phone: String::new(),
            location: String::new(),
            date_of_birth: String::new(),
            agree_to_terms: false,
            receive_newsletter: false,
            receive_sms: false,
            company_name: String::new(),
            contact_person: String::new(),
            business_email: String::new(),
            company_address: Address::default(),
            drug_categories: Vec::new(),
            certifications: Vec::new(),
            website: String::new(),
            linkedin_url: String::new(),
            clinic_name: String::new(),
            administrator_name: String::new(),
            clinic_email: String::new(),
            clinic_address: Address::default(),
            license_number: String::new(),
            license_document: None,
            services_offered: Vec::new(),
            accepted_insurance: Vec::new(),
            operating_hours,
        }
    }
}

/// Field name to message, in the camelCase names the form uses.
pub type FieldErrors = BTreeMap<&'static str, String>;

/// Outcome of a successful [`RegistrationWizard::next`].
#[derive(Debug, Clone, PartialEq)]
pub enum Advance {
    /// Moved to the given 1-based step.
    Moved(u8),
    /// Last step passed; post this payload.
    Submit(RegisterRequest),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RegistrationWizard {
    data: RegistrationData,
    step: u8,
}

impl Default for RegistrationWizard {
    fn default() -> Self {
        Self::new()
    }
}

impl RegistrationWizard {
    pub fn new() -> Self {
        Self {
            data: RegistrationData::default(),
            step: 1,
        }
    }

    /// Rebuilds the wizard from saved form data. A form with a role already
    /// picked resumes on step 2.
    pub fn restore(saved: &str) -> serde_json::Result<Self> {
        let data: RegistrationData = serde_json::from_str(saved)?;
        let step = if data.role.is_some() { 2 } else { 1 };
        Ok(Self { data, step })
    }

    /// Serialises the form. Nothing is worth saving before a role is picked.
    pub fn save(&self) -> serde_json::Result<Option<String>> {
        if self.data.role.is_none() {
            return Ok(None);
        }
        serde_json::to_string(&self.data).map(Some)
    }

    pub fn data(&self) -> &RegistrationData {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut RegistrationData {
        &mut self.data
    }

    /// 1-based index of the step on screen. Editing the role through
    /// [`data_mut`](Self::data_mut) can shorten the flow, so the stored step
    /// is clamped to it.
    pub fn step(&self) -> u8 {
        self.step.clamp(1, self.total_steps())
    }

    pub fn total_steps(&self) -> u8 {
        flow(self.data.role).len() as u8
    }

    pub fn current(&self) -> Step {
        flow(self.data.role)
            .get(usize::from(self.step() - 1))
            .copied()
            .unwrap_or(Step::RoleSelection)
    }

    /// Picking a role only makes sense on the first step.
    pub fn select_role(&mut self, role: RegistrationRole) {
        if self.step() == 1 {
            self.step = 1;
            self.data.role = Some(role);
        }
    }

    pub fn back(&mut self) -> u8 {
        self.step = self.step();
        if self.step > 1 {
            self.step -= 1;
        }
        self.step
    }

    pub fn next(&mut self) -> Result<Advance, FieldErrors> {
        self.validate_current()?;
        self.step = self.step();
        if self.step < self.total_steps() {
            self.step += 1;
            Ok(Advance::Moved(self.step))
        } else {
            Ok(Advance::Submit(self.submission()))
        }
    }

    pub fn validate_current(&self) -> Result<(), FieldErrors> {
        let mut errors = FieldErrors::new();
        let d = &self.data;

        match self.current() {
            Step::RoleSelection => {
                if d.role.is_none() {
                    errors.insert("role", "Please select how you will use HealthLand".into());
                }
            }
            Step::PatientBasicInfo => {
                require(&mut errors, "firstName", &d.first_name, "First name is required");
                require(&mut errors, "lastName", &d.last_name, "Last name is required");
                check_email(&mut errors, "email", &d.email);
                check_password(&mut errors, &d.password);
                if d.password != d.confirm_password {
                    errors.insert("confirmPassword", "Passwords do not match".into());
                }
                if !d.phone.trim().is_empty() && !is_valid_phone(&d.phone) {
                    errors.insert("phone", "Invalid phone number".into());
                }
            }
            Step::PatientLocationPreferences => {
                require(&mut errors, "location", &d.location, "Please choose your wilaya");
            }
            Step::PatientTermsVerification | Step::SupplierTerms | Step::ClinicTerms => {
                if !d.agree_to_terms {
                    errors.insert("agreeToTerms", "You must accept the terms".into());
                }
            }
            Step::SupplierContact => {
                require(&mut errors, "companyName", &d.company_name, "Company name is required");
                require(
                    &mut errors,
                    "contactPerson",
                    &d.contact_person,
                    "Contact person is required",
                );
                check_email(&mut errors, "businessEmail", &d.business_email);
                check_password(&mut errors, &d.password);
            }
            Step::SupplierAddress => {
                require(&mut errors, "companyAddress.street", &d.company_address.street, "Street is required");
                require(&mut errors, "companyAddress.city", &d.company_address.city, "City is required");
            }
            Step::SupplierCertifications => {
                if d.drug_categories.is_empty() {
                    errors.insert("drugCategories", "Select at least one category".into());
                }
            }
            Step::ClinicAdmin => {
                require(&mut errors, "clinicName", &d.clinic_name, "Clinic name is required");
                require(
                    &mut errors,
                    "administratorName",
                    &d.administrator_name,
                    "Administrator name is required",
                );
                check_email(&mut errors, "clinicEmail", &d.clinic_email);
                check_password(&mut errors, &d.password);
            }
            Step::ClinicLicensing => {
                require(
                    &mut errors,
                    "licenseNumber",
                    &d.license_number,
                    "License number is required",
                );
            }
            Step::ClinicServices => {
                if d.services_offered.is_empty() {
                    errors.insert("servicesOffered", "Select at least one service".into());
                }
            }
            Step::ClinicHours => {
                if !d.operating_hours.values().any(|h| h.is_open) {
                    errors.insert("operatingHours", "Open at least one day".into());
                }
                for (day, h) in d.operating_hours.iter().filter(|(_, h)| h.is_open) {
                    if !opens_before_closing(h) {
                        errors.insert("operatingHours", format!("Invalid hours on {day}"));
                    }
                }
            }
        }

        if errors.is_empty() { Ok(()) } else { Err(errors) }
    }

    /// Payload for `/api/auth/register`, built from the role's own fields.
    pub fn submission(&self) -> RegisterRequest {
        let d = &self.data;
        let user_id = [&d.email, &d.clinic_email, &d.business_email]
            .into_iter()
            .map(|e| e.trim())
            .find(|e| !e.is_empty())
            .unwrap_or_default()
            .to_lowercase();

        let full_name = format!("{} {}", d.first_name.trim(), d.last_name.trim());
        let name = [d.clinic_name.trim(), full_name.trim(), d.company_name.trim()]
            .into_iter()
            .find(|n| !n.is_empty())
            .unwrap_or_default()
            .to_string();

        let email = match d.role {
            Some(RegistrationRole::Supplier) => &d.business_email,
            Some(RegistrationRole::Clinic) => &d.clinic_email,
            _ => &d.email,
        };

        let is_clinic = d.role == Some(RegistrationRole::Clinic);
        RegisterRequest {
            user_id: Some(user_id),
            name: Some(name),
            email: Some(email.trim().to_string()),
            password: Some(d.password.clone()),
            role: d.role.map(|r| role_name(r).to_string()),
            certificate: None,
            subscription_plan: is_clinic.then(|| "trial".to_string()),
            subscription_duration: is_clinic.then_some(CLINIC_TRIAL_DAYS),
        }
    }
}

fn role_name(role: RegistrationRole) -> &'static str {
    match role {
        RegistrationRole::Patient => "patient",
        RegistrationRole::Clinic => "clinic",
        RegistrationRole::Supplier => "supplier",
    }
}

fn require(errors: &mut FieldErrors, field: &'static str, value: &str, message: &str) {
    if value.trim().is_empty() {
        errors.insert(field, message.to_string());
    }
}

fn check_email(errors: &mut FieldErrors, field: &'static str, value: &str) {
    if !is_valid_email(value.trim()) {
        errors.insert(field, "Invalid email format".to_string());
    }
}

fn check_password(errors: &mut FieldErrors, password: &str) {
    if !is_strong_password(password) {
        errors.insert("password", PASSWORD_RULE.to_string());
    }
}

fn opens_before_closing(hours: &OpeningHours) -> bool {
    let parse = |t: &str| NaiveTime::parse_from_str(t, "%H:%M").ok();
    matches!((parse(&hours.open), parse(&hours.close)), (Some(o), Some(c)) if o < c)
}
