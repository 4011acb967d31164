#[macro_use]
extern crate rocket;

#[launch]
fn rocket() -> _ {
    expense_tracker::build(rocket::Config::figment())
}
