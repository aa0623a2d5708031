use super::{
    check_optional_date, check_positive_integer, check_positive_number, invalid, optional, parse_date,
    require, EntityForm, FieldError, FormError,
};
use crate::models::{PayrollEmployee, PayrollStatus, RecordId};

#[derive(Debug, Clone, Default)]
pub struct PayrollForm {
    pub employee_id: String,
    pub name: String,
    pub designation: String,
    pub salary_per_month: String,
    pub deduction: String,
    pub status: String,
    pub pay_date: String,
}

impl EntityForm for PayrollForm {
    type Entity = PayrollEmployee;

    const FIELDS: &'static [&'static str] = &[
        "employee_id",
        "name",
        "designation",
        "salary_per_month",
        "deduction",
        "status",
        "pay_date",
    ];

    fn from_entity(p: &PayrollEmployee) -> Self {
        Self {
            employee_id: p.employee_id.to_string(),
            name: p.name.clone(),
            designation: p.designation.clone(),
            salary_per_month: p.salary_per_month.to_string(),
            deduction: p.deduction.to_string(),
            status: p.status.as_str().to_string(),
            pay_date: p.pay_date.map(|d| d.to_string()).unwrap_or_default(),
        }
    }

    fn get(&self, field: &str) -> Option<&str> {
        Some(match field {
            "employee_id" => self.employee_id.as_str(),
            "name" => self.name.as_str(),
            "designation" => self.designation.as_str(),
            "salary_per_month" => self.salary_per_month.as_str(),
            "deduction" => self.deduction.as_str(),
            "status" => self.status.as_str(),
            "pay_date" => self.pay_date.as_str(),
            _ => return None,
        })
    }

    fn set(&mut self, field: &str, value: String) -> bool {
        let slot = match field {
            "employee_id" => &mut self.employee_id,
            "name" => &mut self.name,
            "designation" => &mut self.designation,
            "salary_per_month" => &mut self.salary_per_month,
            "deduction" => &mut self.deduction,
            "status" => &mut self.status,
            "pay_date" => &mut self.pay_date,
            _ => return false,
        };
        *slot = value;
        true
    }

    fn validate(&self) -> Vec<FieldError> {
        let mut errors = Vec::new();
        check_positive_integer(&mut errors, "employee_id", &self.employee_id);
        require(&mut errors, "name", &self.name);
        check_positive_number(&mut errors, "salary_per_month", &self.salary_per_month);

        let deduction = self.deduction.trim();
        if !deduction.is_empty() {
            match deduction.parse::<f64>() {
                Ok(d) if d.is_finite() && d >= 0.0 => {
                    if let Ok(salary) = self.salary_per_month.trim().parse::<f64>() {
                        if d > salary {
                            errors.push(FieldError::new("deduction", "cannot exceed the monthly salary"));
                        }
                    }
                }
                _ => errors.push(FieldError::new("deduction", "must be zero or a positive number")),
            }
        }

        if !self.status.trim().is_empty() && PayrollStatus::parse(&self.status).is_none() {
            errors.push(FieldError::new("status", "must be pending or completed"));
        }
        check_optional_date(&mut errors, "pay_date", &self.pay_date);
        errors
    }

    fn build(&self, existing: Option<&PayrollEmployee>) -> Result<PayrollEmployee, FormError> {
        let employee_id = self
            .employee_id
            .trim()
            .parse::<u32>()
            .map_err(|_| invalid("employee_id", "must be a positive whole number"))?;
        let salary_per_month = self
            .salary_per_month
            .trim()
            .parse::<f64>()
            .map_err(|_| invalid("salary_per_month", "must be a positive number"))?;
        let deduction = match optional(&self.deduction) {
            Some(d) => d
                .parse::<f64>()
                .map_err(|_| invalid("deduction", "must be zero or a positive number"))?,
            None => 0.0,
        };

        Ok(PayrollEmployee {
            id: existing.map(|p| p.id.clone()).unwrap_or_else(RecordId::new_local),
            employee_id,
            name: self.name.trim().to_string(),
            designation: self.designation.trim().to_string(),
            salary_per_month,
            deduction,
            status: PayrollStatus::parse(&self.status)
                .or(existing.map(|p| p.status))
                .unwrap_or_default(),
            pay_date: parse_date(&self.pay_date),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::form::FormController;

    fn filled(salary: &str, deduction: &str) -> FormController<PayrollForm> {
        let mut form = FormController::<PayrollForm>::new();
        form.handle_change("employee_id", "104").unwrap();
        form.handle_change("name", "Priya Nair").unwrap();
        form.handle_change("salary_per_month", salary).unwrap();
        form.handle_change("deduction", deduction).unwrap();
        form
    }

    #[test]
    fn test_payroll_net_salary_from_form() {
        let mut form = filled("4800", "300");
        let record = form.payload().unwrap();
        assert_eq!(record.employee_id, 104);
        assert_eq!(record.net_salary(), 4500.0);
        assert_eq!(record.status, PayrollStatus::Pending);
    }

    #[test]
    fn test_deduction_cannot_exceed_salary() {
        let mut form = filled("1000", "1500");
        assert!(form.payload().is_err());
        assert_eq!(form.errors()[0].field, "deduction");
    }

    #[test]
    fn test_employee_id_must_be_positive() {
        let mut form = filled("1000", "");
        form.handle_change("employee_id", "0").unwrap();
        assert!(form.payload().is_err());
        assert_eq!(form.errors()[0].field, "employee_id");
    }
}
