use rocket::http::Status;
use rocket::serde::json::{self, Json};
use rocket::{Request, State};
use serde::Serialize;

use crate::db::Store;
use crate::error::{ErrorBody, ExpenseError};
use crate::models::{Expense, ExpenseFilter, ExpenseInput, SummaryRow};
use crate::service::ExpenseService;

#[derive(Serialize)]
pub struct Created {
    pub id: i64,
}

#[derive(Serialize)]
pub struct Message {
    pub message: &'static str,
}

type Payload<'r> = Result<Json<ExpenseInput>, json::Error<'r>>;

fn decode(payload: Payload<'_>) -> Result<ExpenseInput, ExpenseError> {
    payload
        .map(Json::into_inner)
        .map_err(|err| ExpenseError::Validation(format!("Invalid expense body: {err}")))
}

#[get("/api/expenses?<category>&<date>")]
pub fn list_expenses(
    store: &State<Store>,
    category: Option<&str>,
    date: Option<&str>,
) -> Result<Json<Vec<Expense>>, ExpenseError> {
    let filter = ExpenseFilter::from_query(category, date)?;
    Ok(Json(store.inner().expenses(&filter)?))
}

#[post("/api/expenses", data = "<payload>")]
pub fn create_expense(
    store: &State<Store>,
    payload: Payload<'_>,
) -> Result<Json<Created>, ExpenseError> {
    let input = decode(payload)?;
    let id = store.inner().create_expense(&input)?;
    Ok(Json(Created { id }))
}

#[put("/api/expenses/<id>", data = "<payload>")]
pub fn update_expense(
    store: &State<Store>,
    id: i64,
    payload: Payload<'_>,
) -> Result<Json<Created>, ExpenseError> {
    let input = decode(payload)?;
    let id = store.inner().update_expense(id, &input)?;
    Ok(Json(Created { id }))
}

#[delete("/api/expenses/<id>")]
pub fn delete_expense(store: &State<Store>, id: i64) -> Result<Json<Message>, ExpenseError> {
    store.inner().delete_expense(id)?;
    Ok(Json(Message {
        message: "Expense deleted successfully",
    }))
}

#[get("/api/categories")]
pub fn categories(store: &State<Store>) -> Result<Json<Vec<String>>, ExpenseError> {
    Ok(Json(store.inner().categories()?))
}

#[get("/api/summary")]
pub fn summary(store: &State<Store>) -> Result<Json<Vec<SummaryRow>>, ExpenseError> {
    Ok(Json(store.inner().summary()?))
}

#[catch(default)]
pub fn json_catcher(status: Status, _req: &Request<'_>) -> Json<ErrorBody> {
    Json(ErrorBody {
        error: status.reason().unwrap_or("Unknown error").to_string(),
    })
}
