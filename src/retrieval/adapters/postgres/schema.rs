//! Diesel schema for stored objects.

diesel::table! {
    /// JSON-encoded objects keyed by agent and object name.
    qc_objects (id) {
        /// Row identifier.
        id -> Uuid,
        /// Namespace (agent) the object belongs to.
        #[max_length = 255]
        agent -> Varchar,
        /// Object name within the agent; may contain `/`.
        #[max_length = 1024]
        object_name -> Varchar,
        /// JSON payload returned to callers.
        payload -> Jsonb,
        /// Version timestamp.
        created_at -> Timestamptz,
    }
}
