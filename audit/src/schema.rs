// Audit store tables. Each table carries an auto-increment `id` key.

diesel::table! {
    used_deposit_addresses (id) {
        id -> BigInt,
        node_id -> Text,
        network -> Text,
        address -> Text,
    }
}

diesel::table! {
    mint_deposit_addresses (id) {
        id -> BigInt,
        node_id -> Text,
        network -> Text,
        mint_address -> Text,
        deposit_address -> Text,
        redeem_script -> Text,
        approved_tax -> Text,
    }
}

diesel::table! {
    withdrawals_log (id) {
        id -> BigInt,
        node_id -> Text,
        network -> Text,
        burn_address -> Text,
        burn_index -> BigInt,
        approved_amount -> Text,
        approved_tax -> Text,
    }
}

diesel::table! {
    debug_logs (id) {
        id -> BigInt,
        node_id -> Text,
        network -> Text,
        log_type -> Text,
        log_message -> Text,
        details -> Nullable<Text>,
    }
}

diesel::allow_tables_to_appear_in_same_query!(
    used_deposit_addresses,
    mint_deposit_addresses,
    withdrawals_log,
    debug_logs,
);
