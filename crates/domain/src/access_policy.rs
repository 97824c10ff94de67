//! Role-based location access policy.

use std::collections::{BTreeSet, HashMap};

use locus_core::{AppError, AppResult};

use crate::LocationId;

/// Facility locations known to the built-in policy table.
pub mod facility {
    /// CHRR.
    pub const CHRR: &str = "18aed7d1-95f8-4b91-aaae-00476cc94794";
    /// Entry office.
    pub const ENTRY_OFFICE: &str = "bbf2b0d5-d37e-481d-98f2-1373b3642b45";
    /// Reception, triage and emergency.
    pub const RECEPTION_TRIAGE_EMERGENCY: &str = "b3fcde5e-d9fa-4ee1-94a5-5a07f0e6189a";
    /// Transfer.
    pub const TRANSFER: &str = "8f36516e-18e3-4ed2-bd90-805be0729a49";
    /// Pharmacy.
    pub const PHARMACY: &str = "db6cc81b-977a-447f-ad36-656d3b19eae4";
    /// Maternity.
    pub const MATERNITY: &str = "02933282-f1f4-41eb-89b3-ff925f352c4d";
    /// Pediatrics.
    pub const PEDIATRICS: &str = "0fa60b2e-62c7-40b0-bb83-79e47fe02a4e";
    /// Neonatology.
    pub const NEONATOLOGY: &str = "8b0faff9-4099-4011-8816-1b132063bc79";
    /// Men medicine.
    pub const MEN_MEDICINE: &str = "5df13554-8f01-43c8-b2c2-c010b639dae4";
    /// Women medicine.
    pub const WOMEN_MEDICINE: &str = "17caef4f-3ed2-42ad-a2a7-a514e23cf89a";
    /// Paid medicine.
    pub const PAID_MEDICINE: &str = "31ee12b0-3212-4ee5-969f-ca7c70853a95";
    /// Pediatric and adult surgery.
    pub const PEDIATRIC_AND_ADULT_SURGERY: &str = "4df29277-cf4d-47e4-a89b-efa91279c3f0";
    /// Paid surgery.
    pub const PAID_SURGERY: &str = "63362664-c2b0-487a-a6f9-5f7b3a555d04";
    /// Operating room.
    pub const OPERATING_ROOM: &str = "b7c0bdcd-b9aa-498d-a764-1f8fbd39b063";
    /// Laboratory.
    pub const LABORATORY: &str = "d00ac233-12c8-4c0e-bc2e-c54f8a541ada";
    /// Imaging.
    pub const IMAGING: &str = "d8c07f2a-046f-4c3b-97e1-fe32c1446214";
    /// Dentistry.
    pub const DENTISTRY: &str = "d8428aad-98d8-4553-8706-ee80e37c796a";
    /// Respiratory diseases service.
    pub const RESPIRATORY_DISEASES_SERVICE: &str = "370c1a81-9b05-47d0-8eb4-262351d543a2";
    /// Rabies treatment center.
    pub const RABIES_TREATMENT_CENTER: &str = "66d869bd-7c2c-49f1-b0c4-3ee4a6df7612";
    /// Acupuncture.
    pub const ACUPUNCTURE: &str = "bd46e413-3b45-4bab-8763-dccc709e608b";
    /// Blood transfusion center.
    pub const BLOOD_TRANSFUSION_CENTER: &str = "1ca8c9b3-efcb-49a2-824b-c12da0108aad";
    /// Accounting.
    pub const ACCOUNTING: &str = "2bd55313-efcb-49a2-824b-c12da0108aad";
}

const BUILTIN_TABLE: &[(&str, &str)] = &[
    ("Access: CHRR", facility::CHRR),
    ("Access: Entry Office", facility::ENTRY_OFFICE),
    (
        "Access: Reception - Triage - Emergency",
        facility::RECEPTION_TRIAGE_EMERGENCY,
    ),
    ("Access: Transfer", facility::TRANSFER),
    ("Access: Pharmacy", facility::PHARMACY),
    ("Access: Maternity", facility::MATERNITY),
    ("Access: Pediatrics", facility::PEDIATRICS),
    ("Access: Neonatology", facility::NEONATOLOGY),
    ("Access: Men Medicine", facility::MEN_MEDICINE),
    ("Access: Women Medicine", facility::WOMEN_MEDICINE),
    ("Access: Paid Medicine", facility::PAID_MEDICINE),
    (
        "Access: Pediatric and Adult Surgery",
        facility::PEDIATRIC_AND_ADULT_SURGERY,
    ),
    ("Access: Paid Surgery", facility::PAID_SURGERY),
    ("Access: Operating Room", facility::OPERATING_ROOM),
    ("Access: Laboratory", facility::LABORATORY),
    ("Access: Imaging", facility::IMAGING),
    ("Access: Dentistry", facility::DENTISTRY),
    (
        "Access: Respiratory Diseases Service",
        facility::RESPIRATORY_DISEASES_SERVICE,
    ),
    (
        "Access: Rabies Treatment Center",
        facility::RABIES_TREATMENT_CENTER,
    ),
    ("Access: Acupuncture", facility::ACUPUNCTURE),
    (
        "Access: Blood Transfusion Center",
        facility::BLOOD_TRANSFUSION_CENTER,
    ),
    ("Access: Accounting", facility::ACCOUNTING),
];

/// Read-only mapping from role name to the location that role unlocks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccessPolicy {
    table: HashMap<String, LocationId>,
}

impl AccessPolicy {
    /// Returns the policy with the built-in facility roles.
    #[must_use]
    pub fn builtin() -> Self {
        let table = BUILTIN_TABLE
            .iter()
            .filter_map(|(role_name, location_id)| {
                LocationId::new(*location_id)
                    .ok()
                    .map(|location_id| ((*role_name).to_owned(), location_id))
            })
            .collect();

        Self { table }
    }

    /// Creates a policy from explicit role-name and location-id pairs.
    pub fn from_entries<I, R, L>(entries: I) -> AppResult<Self>
    where
        I: IntoIterator<Item = (R, L)>,
        R: Into<String>,
        L: Into<String>,
    {
        let mut table = HashMap::new();
        for (role_name, location_id) in entries {
            let role_name = role_name.into();
            if role_name.is_empty() {
                return Err(AppError::Validation(
                    "access policy role name must not be empty".to_owned(),
                ));
            }

            let location_id = LocationId::new(location_id)?;
            table.insert(role_name, location_id);
        }

        Ok(Self { table })
    }

    /// Parses a policy from a JSON object of `"role name": "location id"` pairs.
    pub fn from_json(document: &str) -> AppResult<Self> {
        let entries: HashMap<String, String> = serde_json::from_str(document).map_err(|error| {
            AppError::Validation(format!("invalid access policy document: {error}"))
        })?;

        Self::from_entries(entries)
    }

    /// Returns the number of role entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.table.len()
    }

    /// Returns whether the table has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.table.is_empty()
    }

    /// Resolves the locations unlocked by the given role names.
    ///
    /// Names are matched exactly; names without a table entry are ignored.
    #[must_use]
    pub fn allowed_location_ids<'a, I>(&self, role_names: I) -> AllowedLocations
    where
        I: IntoIterator<Item = &'a str>,
    {
        AllowedLocations(
            role_names
                .into_iter()
                .filter_map(|role_name| self.table.get(role_name).cloned())
                .collect(),
        )
    }
}

impl Default for AccessPolicy {
    fn default() -> Self {
        Self::builtin()
    }
}

/// Locations a user may select.
///
/// An empty set places no restriction on the user.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllowedLocations(BTreeSet<LocationId>);

impl AllowedLocations {
    /// Returns an allowlist that does not restrict anything.
    #[must_use]
    pub fn unrestricted() -> Self {
        Self::default()
    }

    /// Returns whether no location restriction applies.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns whether the location may be selected.
    #[must_use]
    pub fn permits(&self, location_id: &LocationId) -> bool {
        self.is_unrestricted() || self.0.contains(location_id)
    }

    /// Iterates over the allowed ids in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = &LocationId> {
        self.0.iter()
    }

    /// Returns the number of allowed ids.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns whether the allowlist holds no ids.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<LocationId> for AllowedLocations {
    fn from_iter<T: IntoIterator<Item = LocationId>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
