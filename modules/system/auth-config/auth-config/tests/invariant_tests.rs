#![allow(clippy::unwrap_used, clippy::expect_used)]

//! Random interleavings of registry operations against a simple model

mod common;

use std::collections::BTreeMap;

use auth_config::{ProviderConfigEntry, RegistrationId, RegistrationKey};
use common::{ECHO_CLASS, create_factory, named};
use proptest::prelude::*;

#[derive(Debug, Clone)]
enum RegistryOp {
    Instance(RegistrationKey),
    Class(RegistrationKey),
    Remove(RegistrationKey),
    Lookup(RegistrationKey),
}

fn component() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(Some("A".to_owned())),
        Just(Some("B".to_owned())),
        Just(Some(String::new())),
        Just(Some("AB".to_owned())),
    ]
}

fn key_strategy() -> impl Strategy<Value = RegistrationKey> {
    (component(), component()).prop_map(|(layer, app_context)| RegistrationKey { layer, app_context })
}

fn op_strategy() -> impl Strategy<Value = Vec<RegistryOp>> {
    proptest::collection::vec(
        prop_oneof![
            key_strategy().prop_map(RegistryOp::Instance),
            key_strategy().prop_map(RegistryOp::Class),
            key_strategy().prop_map(RegistryOp::Remove),
            key_strategy().prop_map(RegistryOp::Lookup),
        ],
        0..40,
    )
}

proptest! {
    #[test]
    fn property_registry_matches_model(ops in op_strategy()) {
        let (source, factory) = create_factory();
        // key -> persistent
        let mut model: BTreeMap<RegistrationKey, bool> = BTreeMap::new();

        for op in ops {
            match op {
                RegistryOp::Instance(key) => {
                    let id = factory
                        .register_instance(named("instance"), key.layer(), key.app_context(), None)
                        .unwrap();
                    prop_assert_eq!(id.key(), Some(key.clone()));
                    model.insert(key, false);
                }
                RegistryOp::Class(key) => {
                    let id = factory
                        .register_class(ECHO_CLASS, None, key.layer(), key.app_context(), None)
                        .unwrap();
                    prop_assert_eq!(&id, &RegistrationId::for_key(&key));
                    model.insert(key, true);
                }
                RegistryOp::Remove(key) => {
                    let removed = factory.remove_registration(&RegistrationId::for_key(&key));
                    prop_assert_eq!(removed, model.remove(&key).is_some());
                }
                RegistryOp::Lookup(key) => {
                    let expected = key
                        .lookup_chain()
                        .into_iter()
                        .find(|candidate| model.contains_key(candidate));
                    let found = factory.get_config_provider(key.layer(), key.app_context(), None);
                    prop_assert_eq!(found.is_some(), expected.is_some());
                }
            }

            let ids = factory.get_registration_ids(None);
            prop_assert_eq!(ids.len(), model.len());
            for (key, persistent) in &model {
                let ctx = factory
                    .get_registration_context(&RegistrationId::for_key(key))
                    .unwrap();
                prop_assert_eq!(&ctx.key(), key);
                prop_assert_eq!(ctx.persistent, *persistent);
            }
        }

        // Every persisted key still registered as persistent is in the store
        let stored: Vec<RegistrationKey> = source.entries().iter().map(ProviderConfigEntry::key).collect();
        for (key, persistent) in &model {
            if *persistent {
                prop_assert!(stored.contains(key));
            }
        }
    }
}
