//! Синтетическая таблица покупок с той же схемой, что и реальный файл

use ndarray::Array1;
use rand::seq::SliceRandom;
use rand::Rng;

use crate::data::table::{Column, Table};
use crate::error::Result;
use crate::utils::seeded_rng;

pub const CUSTOMER_NAME: &str = "Customer Name";
pub const CUSTOMER_EMAIL: &str = "Customer e-mail";
pub const COUNTRY: &str = "Country";
pub const GENDER: &str = "Gender";
pub const AGE: &str = "Age";
pub const ANNUAL_SALARY: &str = "Annual Salary";
pub const CREDIT_CARD_DEBT: &str = "Credit Card Debt";
pub const NET_WORTH: &str = "Net Worth";
pub const CAR_PURCHASE_AMOUNT: &str = "Car Purchase Amount";

const COUNTRIES: [&str; 6] = ["Bulgaria", "Belize", "Algeria", "Cook Islands", "Brazil", "Liberia"];

/// Сумма покупки без шума; в таблицу к ней добавляется равномерный шум ±1500
pub fn car_purchase_amount(age: f64, salary: f64, debt: f64, worth: f64) -> f64 {
    850.0 * age + 0.5 * salary - 0.1 * debt + 0.03 * worth
}

pub fn car_purchase_table(rows: usize, seed: u64) -> Result<Table> {
    let mut rng = seeded_rng(Some(seed));

    let mut names = Vec::with_capacity(rows);
    let mut emails = Vec::with_capacity(rows);
    let mut countries = Vec::with_capacity(rows);
    let mut gender = Vec::with_capacity(rows);
    let mut age = Vec::with_capacity(rows);
    let mut salary = Vec::with_capacity(rows);
    let mut debt = Vec::with_capacity(rows);
    let mut worth = Vec::with_capacity(rows);
    let mut amount = Vec::with_capacity(rows);

    for i in 0..rows {
        names.push(format!("Customer {}", i));
        emails.push(format!("customer{}@example.com", i));
        countries.push(COUNTRIES.choose(&mut rng).copied().unwrap_or("Belize").to_string());

        let a = rng.gen_range(20.0..=70.0);
        let s = rng.gen_range(20_000.0..=100_000.0);
        let d = rng.gen_range(0.0..=20_000.0);
        let w = rng.gen_range(20_000.0..=800_000.0);
        let noise = rng.gen_range(-1_500.0..=1_500.0);

        gender.push(if rng.gen_bool(0.5) { 1.0 } else { 0.0 });
        age.push(a);
        salary.push(s);
        debt.push(d);
        worth.push(w);
        amount.push(car_purchase_amount(a, s, d, w) + noise);
    }

    let column_names = [
        CUSTOMER_NAME,
        CUSTOMER_EMAIL,
        COUNTRY,
        GENDER,
        AGE,
        ANNUAL_SALARY,
        CREDIT_CARD_DEBT,
        NET_WORTH,
        CAR_PURCHASE_AMOUNT,
    ];
    let columns = vec![
        Column::Text(names),
        Column::Text(emails),
        Column::Text(countries),
        Column::Numeric(Array1::from(gender)),
        Column::Numeric(Array1::from(age)),
        Column::Numeric(Array1::from(salary)),
        Column::Numeric(Array1::from(debt)),
        Column::Numeric(Array1::from(worth)),
        Column::Numeric(Array1::from(amount)),
    ];

    Table::new(column_names.iter().map(|s| s.to_string()).collect(), columns)
}
