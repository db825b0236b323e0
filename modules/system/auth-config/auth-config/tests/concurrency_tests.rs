#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Concurrent writers and readers sharing one factory

mod common;

use std::collections::BTreeSet;
use std::thread;

use auth_config::{AuthConfigProvider, ProviderConfigEntry, RegistrationId, RegistrationKey};
use common::{ECHO_CLASS, create_factory_with, named};

const ROUNDS: usize = 200;
const CHURN_LAYERS: [&str; 4] = ["a", "b", "c", "d"];

#[test]
fn test_concurrent_mutations_keep_registry_consistent() {
    let (_, factory) = create_factory_with(vec![
        ProviderConfigEntry::new(ECHO_CLASS).with_app_context("stored"),
    ]);
    let stable = factory
        .register_instance(named("stable"), Some("stable"), None, None)
        .unwrap();

    thread::scope(|s| {
        s.spawn(|| {
            for i in 0..ROUNDS {
                let layer = CHURN_LAYERS[i % CHURN_LAYERS.len()];
                factory
                    .register_class(ECHO_CLASS, None, Some(layer), None, None)
                    .unwrap();
            }
        });
        s.spawn(|| {
            for i in 0..ROUNDS {
                let layer = CHURN_LAYERS[(i + 1) % CHURN_LAYERS.len()];
                factory
                    .register_instance(named("churn"), Some(layer), None, None)
                    .unwrap();
            }
        });
        s.spawn(|| {
            for i in 0..ROUNDS {
                let layer = CHURN_LAYERS[(i + 2) % CHURN_LAYERS.len()];
                let key = RegistrationKey::new(Some(layer), None);
                factory.remove_registration(&RegistrationId::for_key(&key));
            }
        });
        s.spawn(|| {
            for _ in 0..ROUNDS / 10 {
                factory.refresh().unwrap();
            }
        });

        for _ in 0..2 {
            s.spawn(|| {
                for _ in 0..ROUNDS {
                    // The stable registration is never touched by writers
                    let provider = factory.get_config_provider(Some("stable"), None, None).unwrap();
                    assert_eq!(provider.class_name(), "stable");
                    assert!(factory.get_registration_context(&stable).is_some());
                    assert!(factory.get_registration_ids(None).contains(&stable));

                    // Each snapshot row is a whole registration under its own id
                    let rows = factory.registrations();
                    let ids: BTreeSet<_> = rows.iter().map(|r| r.id.clone()).collect();
                    assert_eq!(ids.len(), rows.len());
                    for row in &rows {
                        assert_eq!(row.id, RegistrationId::for_key(&row.context.key()));
                        assert_eq!(row.context.persistent, row.provider_class == ECHO_CLASS);
                    }
                }
            });
        }
    });

    let ids = factory.get_registration_ids(None);
    assert_eq!(factory.len(), ids.len());
    for id in &ids {
        let ctx = factory.get_registration_context(id).unwrap();
        assert_eq!(&RegistrationId::for_key(&ctx.key()), id);
    }
    assert!(ids.contains(&stable));
}
