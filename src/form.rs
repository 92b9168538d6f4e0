use crate::importer::{parse_visit_date, Field};
use crate::models::{date_to_utc, VisitEntry, VisitInput};

/// A field-level message from form validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: Field,
    pub message: &'static str,
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field.label(), self.message)
    }
}

/// Raw, user-typed values for a visit entry.
#[derive(Debug, Clone, Default)]
pub struct VisitForm {
    pub hospital_name: String,
    pub visit_date: String,
    pub doctor_name: String,
    pub patient_name: String,
    pub hospital_rs: String,
    pub medicine_rs: String,
    pub medicine_name: String,
    pub address: String,
}

enum Charge {
    Missing,
    NotANumber,
    Fractional,
    TooLarge,
}

fn parse_whole_charge(raw: &str) -> Result<u64, Charge> {
    let s = raw.trim();
    if s.is_empty() {
        return Err(Charge::Missing);
    }
    let n: f64 = s.parse().map_err(|_| Charge::NotANumber)?;
    if !n.is_finite() || n < 0.0 {
        return Err(Charge::NotANumber);
    }
    if n.fract() != 0.0 {
        return Err(Charge::Fractional);
    }
    if n >= i64::MAX as f64 {
        return Err(Charge::TooLarge);
    }
    Ok(n as u64)
}

fn charge_message(err: Charge, missing: &'static str) -> &'static str {
    match err {
        Charge::Missing => missing,
        Charge::NotANumber => "Must be a valid number (0 or greater)",
        Charge::Fractional => "Invalid number format. Please enter whole numbers only (no decimals).",
        Charge::TooLarge => "Amount is too large",
    }
}

impl VisitForm {
    /// Prefill from a stored entry, for editing.
    pub fn from_entry(entry: &VisitEntry) -> Self {
        Self {
            hospital_name: entry.hospital_name.clone(),
            visit_date: entry.visit_day().format("%Y-%m-%d").to_string(),
            doctor_name: entry.doctor_name.clone(),
            patient_name: entry.patient_name.clone(),
            hospital_rs: entry.hospital_rs.to_string(),
            medicine_rs: entry.medicine_rs.to_string(),
            medicine_name: entry.medicine_name.clone(),
            address: entry.address.clone(),
        }
    }

    /// Check every field, returning all problems at once.
    pub fn validate(&self) -> Result<VisitInput, Vec<FieldError>> {
        let mut errors = Vec::new();
        let mut fail = |field, message| errors.push(FieldError { field, message });

        let hospital_name = self.hospital_name.trim();
        if hospital_name.is_empty() {
            fail(Field::HospitalName, "Hospital name is required");
        }

        let visit_date = if self.visit_date.trim().is_empty() {
            fail(Field::VisitDate, "Visit date is required");
            None
        } else {
            let parsed = parse_visit_date(&self.visit_date);
            if parsed.is_none() {
                fail(Field::VisitDate, "Please enter a valid date (MM/DD/YYYY)");
            }
            parsed
        };

        let doctor_name = self.doctor_name.trim();
        if doctor_name.is_empty() {
            fail(Field::DoctorName, "Doctor name is required");
        }
        let patient_name = self.patient_name.trim();
        if patient_name.is_empty() {
            fail(Field::PatientName, "Patient name is required");
        }

        let hospital_rs = parse_whole_charge(&self.hospital_rs)
            .map_err(|e| fail(Field::HospitalCharges, charge_message(e, "Hospital charges are required")))
            .ok();
        let medicine_rs = parse_whole_charge(&self.medicine_rs)
            .map_err(|e| fail(Field::MedicineCharges, charge_message(e, "Medicine charges are required")))
            .ok();

        let medicine_name = self.medicine_name.trim();
        if medicine_name.is_empty() {
            fail(Field::MedicineName, "Medicine name is required");
        }
        let address = self.address.trim();
        if address.is_empty() {
            fail(Field::Address, "Address is required");
        }

        match (visit_date, hospital_rs, medicine_rs) {
            (Some(date), Some(hospital_rs), Some(medicine_rs)) if errors.is_empty() => Ok(VisitInput {
                hospital_name: hospital_name.to_string(),
                visit_date: date_to_utc(date).timestamp_millis(),
                doctor_name: doctor_name.to_string(),
                patient_name: patient_name.to_string(),
                hospital_rs,
                medicine_rs,
                medicine_name: medicine_name.to_string(),
                address: address.to_string(),
            }),
            _ => Err(errors),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filled() -> VisitForm {
        VisitForm {
            hospital_name: " City Hospital ".into(),
            visit_date: "01/15/2024".into(),
            doctor_name: "Dr. Smith".into(),
            patient_name: "John Doe".into(),
            hospital_rs: "5000".into(),
            medicine_rs: "0".into(),
            medicine_name: "Paracetamol".into(),
            address: "123 Main St".into(),
        }
    }

    #[test]
    fn test_valid_form() {
        let input = filled().validate().unwrap();
        assert_eq!(input.hospital_name, "City Hospital");
        assert_eq!(input.visit_date, 1_705_276_800_000);
        assert_eq!(input.hospital_rs, 5000);
        assert_eq!(input.medicine_rs, 0);
    }

    #[test]
    fn test_empty_form_reports_every_field() {
        let errors = VisitForm::default().validate().unwrap_err();
        let messages: Vec<&str> = errors.iter().map(|e| e.message).collect();
        assert_eq!(
            messages,
            vec![
                "Hospital name is required",
                "Visit date is required",
                "Doctor name is required",
                "Patient name is required",
                "Hospital charges are required",
                "Medicine charges are required",
                "Medicine name is required",
                "Address is required",
            ]
        );
    }

    #[test]
    fn test_charge_rules() {
        let mut form = filled();
        form.hospital_rs = "-1".into();
        form.medicine_rs = "12.5".into();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, Field::HospitalCharges);
        assert_eq!(errors[0].message, "Must be a valid number (0 or greater)");
        assert_eq!(errors[1].field, Field::MedicineCharges);
        assert!(errors[1].message.starts_with("Invalid number format"));
    }

    #[test]
    fn test_charge_too_large_is_not_called_fractional() {
        let mut form = filled();
        form.hospital_rs = "10000000000000000000".into();
        form.medicine_rs = "9223372036854775807".into();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[0].field, Field::HospitalCharges);
        assert_eq!(errors[0].message, "Amount is too large");
        assert_eq!(errors[1].message, "Amount is too large");
    }

    #[test]
    fn test_bad_date() {
        let mut form = filled();
        form.visit_date = "31/31/2024".into();
        let errors = form.validate().unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].to_string(), "Visit Date: Please enter a valid date (MM/DD/YYYY)");
    }

    #[test]
    fn test_from_entry_roundtrips() {
        let input = filled().validate().unwrap();
        let entry = VisitEntry {
            id: 1,
            owner: "local".into(),
            created_at: 0,
            visit_date: input.visit_date,
            hospital_name: input.hospital_name.clone(),
            doctor_name: input.doctor_name.clone(),
            patient_name: input.patient_name.clone(),
            hospital_rs: input.hospital_rs,
            medicine_rs: input.medicine_rs,
            medicine_name: input.medicine_name.clone(),
            address: input.address.clone(),
        };
        let form = VisitForm::from_entry(&entry);
        assert_eq!(form.visit_date, "2024-01-15");
        assert_eq!(form.validate().unwrap(), input);
    }
}
