//! `endorctl artifact sign` and `endorctl artifact verify`.

use super::rules::{always, Enforcement, Requirement, Rule};

pub static SIGN_RULES: &[Rule] = &[
    Rule {
        name: "artifact_name",
        when: always,
        requires: &[Requirement {
            holds: |v| !v.inputs.artifact_name.is_empty(),
            message: "artifact_name is required for the sign command and must be passed as an input from the workflow",
        }],
        emit: |v| vec![format!("--name={}", v.inputs.artifact_name)],
        enforcement: Enforcement::Fatal,
    },
    // With the action token, provenance comes from the token's claims.
    Rule {
        name: "provenance",
        when: |v| !v.inputs.enable_github_action_token,
        requires: &[Requirement {
            holds: |v| {
                !v.inputs.certificate_oidc_issuer.is_empty()
                    && !v.inputs.source_repository_ref.is_empty()
            },
            message: "Required information not found. Either set enable_github_action_token: true or provide certificate_oidc_issuer and source_repository_ref",
        }],
        emit: |v| {
            vec![
                format!("--certificate-oidc-issuer={}", v.inputs.certificate_oidc_issuer),
                format!("--source-repository-ref={}", v.inputs.source_repository_ref),
            ]
        },
        enforcement: Enforcement::Fatal,
    },
];

pub static VERIFY_RULES: &[Rule] = &[
    Rule {
        name: "artifact_name",
        when: always,
        requires: &[Requirement {
            holds: |v| !v.inputs.artifact_name.is_empty(),
            message: "artifact_name is required for the verify command and must be passed as an input from the workflow",
        }],
        emit: |v| vec![format!("--name={}", v.inputs.artifact_name)],
        enforcement: Enforcement::Fatal,
    },
    Rule {
        name: "certificate_oidc_issuer",
        when: always,
        requires: &[Requirement {
            holds: |v| !v.inputs.certificate_oidc_issuer.is_empty(),
            message: "certificate_oidc_issuer is required and must be passed as an input from the workflow",
        }],
        emit: |v| {
            vec![format!(
                "--certificate-oidc-issuer={}",
                v.inputs.certificate_oidc_issuer
            )]
        },
        enforcement: Enforcement::Fatal,
    },
];
