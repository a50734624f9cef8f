use std::{process::ExitCode, sync::Arc};

use injector::{
    deps, Arguments, Component, DynError, InjectionOptions, MissingDependencyPolicy, Produced,
    Registry, ResolveOptions,
};
use tracing_subscriber::EnvFilter;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .init();

    let mut registry = Registry::new();
    if let Err(e) = declare_components(&mut registry) {
        tracing::error!("{e}");
        return ExitCode::FAILURE;
    }

    let options = ResolveOptions::new().missing_dependencies(MissingDependencyPolicy::Warn);
    match futures::executor::block_on(registry.resolve_with(options)) {
        Ok(pool) => {
            println!("{pool:?}");
            if let Some(handler) = pool.get::<RequestHandler>() {
                println!("{}", handler.describe());
            }
            ExitCode::SUCCESS
        }
        Err(e) => {
            tracing::error!("Resolution failed: {e}");
            ExitCode::FAILURE
        }
    }
}

fn declare_components(registry: &mut Registry) -> Result<(), injector::RegisterError> {
    registry
        .register::<Settings>(
            vec![],
            Some(InjectionOptions::factory(|| {
                Ok(Produced::deferred(async {
                    Ok::<_, DynError>(Settings {
                        database_url: "postgres://localhost/app".to_string(),
                    })
                }))
            })),
        )?
        .declare::<Database>()?
        .declare::<UserRepository>()?
        .declare::<RequestHandler>()?;
    Ok(())
}

#[derive(Debug)]
struct Settings {
    database_url: String,
}
impl Component for Settings {
    fn construct(_: Arguments) -> Result<Self, DynError> {
        Err("settings are produced by their factory".into())
    }
}

#[derive(Debug)]
struct Database {
    url: String,
}
impl Component for Database {
    fn dependencies() -> Vec<injector::TypeInfo> {
        deps![Settings]
    }

    fn construct(mut args: Arguments) -> Result<Self, DynError> {
        let settings = args.next::<Arc<Settings>>()?;
        Ok(Database {
            url: settings.database_url.clone(),
        })
    }
}

#[derive(Debug)]
struct Metrics;

#[derive(Debug)]
struct UserRepository {
    database: Arc<Database>,
    metrics: Option<Arc<Metrics>>,
}
impl Component for UserRepository {
    fn dependencies() -> Vec<injector::TypeInfo> {
        // Metrics is never registered and resolves to an absent argument
        deps![Database, Metrics]
    }

    fn construct(mut args: Arguments) -> Result<Self, DynError> {
        Ok(UserRepository {
            database: args.next()?,
            metrics: args.next()?,
        })
    }
}

#[derive(Debug)]
struct RequestHandler {
    users: Arc<UserRepository>,
}
impl RequestHandler {
    fn describe(&self) -> String {
        format!(
            "RequestHandler -> UserRepository (metrics: {}) -> Database({})",
            self.users.metrics.is_some(),
            self.users.database.url
        )
    }
}
impl Component for RequestHandler {
    fn dependencies() -> Vec<injector::TypeInfo> {
        deps![UserRepository]
    }

    fn construct(mut args: Arguments) -> Result<Self, DynError> {
        Ok(RequestHandler { users: args.next()? })
    }
}
