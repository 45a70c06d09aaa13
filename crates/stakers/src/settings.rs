use std::collections::BTreeMap;

use shared::models::network::Network;
use shared::models::staker::{NetworkAttachment, NetworkSettings, StakerParams, UserSettings};

use crate::params;

/// Compute the compose-override payload for a staker service. With `params`
/// absent (package deselected or settings re-applied from defaults) the
/// environment is empty but the network section is still populated: aliases
/// must stay coherent even for a "none selected" state.
///
/// Structural assembly only; semantic validity of individual values is the
/// caller's responsibility.
pub fn build_user_settings(
    service: &str,
    network: Network,
    role_params: Option<&StakerParams>,
) -> UserSettings {
    let mut environment = BTreeMap::new();
    if let Some(role_params) = role_params {
        let vars = role_environment(role_params);
        if !vars.is_empty() {
            environment.insert(service.to_string(), vars);
        }
    }

    UserSettings {
        environment,
        networks: staker_network_settings(service, network),
    }
}

fn role_environment(role_params: &StakerParams) -> BTreeMap<String, String> {
    let mut vars = BTreeMap::new();
    match role_params {
        StakerParams::Execution => {}
        StakerParams::Consensus {
            graffiti,
            fee_recipient,
            checkpoint_sync_url,
        } => {
            if let Some(graffiti) = graffiti {
                vars.insert("GRAFFITI".to_string(), graffiti.clone());
            }
            if let Some(fee_recipient) = fee_recipient {
                vars.insert("FEE_RECIPIENT_ADDRESS".to_string(), fee_recipient.clone());
            }
            if let Some(url) = checkpoint_sync_url {
                vars.insert("CHECKPOINT_SYNC_URL".to_string(), url.clone());
            }
        }
        StakerParams::MevBoost { relays } => {
            vars.insert("RELAYS".to_string(), sanitize_relays(relays));
        }
    }
    vars
}

/// Join relay URLs with a single comma. Empty entries and duplicates are
/// dropped so the value never carries a leading, trailing or doubled
/// separator.
fn sanitize_relays(relays: &[String]) -> String {
    let mut seen: Vec<&str> = Vec::new();
    for relay in relays {
        let relay = relay.trim();
        if !relay.is_empty() && !seen.contains(&relay) {
            seen.push(relay);
        }
    }
    seen.join(",")
}

/// Fixed alias scheme: `<service>.<network>.staker.dappnode` on the
/// per-network staker overlay and `<service>.<network>.dncore.dappnode` on
/// the core overlay. Internal DNS and other packages depend on these names.
fn staker_network_settings(service: &str, network: Network) -> NetworkSettings {
    let staker_network = params::docker_staker_network(network);

    let mut attachments = BTreeMap::new();
    attachments.insert(
        staker_network.clone(),
        NetworkAttachment {
            aliases: vec![format!(
                "{}.{}.{}",
                service,
                network,
                params::STAKER_ALIAS_DOMAIN
            )],
        },
    );
    attachments.insert(
        params::DOCKER_PRIVATE_NETWORK_NAME.to_string(),
        NetworkAttachment {
            aliases: vec![format!(
                "{}.{}.{}",
                service,
                network,
                params::CORE_ALIAS_DOMAIN
            )],
        },
    );

    let mut service_networks = BTreeMap::new();
    service_networks.insert(service.to_string(), attachments);

    NetworkSettings {
        root_networks: vec![
            staker_network,
            params::DOCKER_PRIVATE_NETWORK_NAME.to_string(),
        ],
        service_networks,
    }
}
