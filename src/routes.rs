use crate::{
    api::{attendance, leave, overtime, payroll},
    config::Config,
};
use actix_web::web;

pub fn configure(cfg: &mut web::ServiceConfig, config: &Config) {
    cfg.service(
        web::scope(&config.api_prefix)
            .service(
                web::scope("/attendance")
                    // /attendance/rebuild
                    .service(web::resource("/rebuild").route(web::post().to(attendance::rebuild)))
                    // /attendance/metrics
                    .service(web::resource("/metrics").route(web::get().to(attendance::metrics))),
            )
            .service(
                web::scope("/leave")
                    // /leave
                    .service(web::resource("").route(web::post().to(leave::create_leave)))
                    // /leave/{id}
                    .service(web::resource("/{id}").route(web::put().to(leave::update_leave)))
                    // /leave/{id}/approve
                    .service(
                        web::resource("/{id}/approve").route(web::put().to(leave::approve_leave)),
                    )
                    // /leave/{id}/reject
                    .service(
                        web::resource("/{id}/reject").route(web::put().to(leave::reject_leave)),
                    ),
            )
            .service(
                web::scope("/leave-balances")
                    // /leave-balances
                    .service(web::resource("").route(web::get().to(leave::list_balances)))
                    // /leave-balances/seed
                    .service(web::resource("/seed").route(web::post().to(leave::seed_balances)))
                    // /leave-balances/adjust
                    .service(web::resource("/adjust").route(web::post().to(leave::adjust_balance))),
            )
            .service(
                web::scope("/overtime")
                    // /overtime
                    .service(web::resource("").route(web::post().to(overtime::create_ot))),
            )
            .service(
                web::scope("/payroll")
                    // /payroll/runs/{run_id}/employees/{employee_id}/calculate
                    .service(
                        web::resource("/runs/{run_id}/employees/{employee_id}/calculate")
                            .route(web::post().to(payroll::calculate_entry)),
                    ),
            ),
    );
}
