//! # sqlgate-rewrite
//!
//! Static SQL enforcement for model-generated candidates.
//!
//! The model proposes, this crate disposes: a candidate string is guarded,
//! parsed, resolved against the schema snapshot, tenant-filtered, paginated
//! and re-serialized before anything touches the database.
//!
//! **Before (from the model):**
//! ```sql
//! SELECT u.id, p.amount FROM users u LEFT JOIN payments p ON p.userId = u.id
//! ```
//!
//! **After (to Postgres):**
//! ```sql
//! SELECT u."id", p."amount" FROM "users" AS u
//!   LEFT JOIN "payments" AS p ON p."userId" = u."id" AND "p"."organizationId" = $1
//!   WHERE "u"."organizationId" = $1 LIMIT 11 OFFSET 0
//! ```
//!
//! Stages run strictly forward and each one owns a single invariant:
//!
//! | Stage | Invariant |
//! |---|---|
//! | [`guard`] | no statement separators, comments, write keywords, locks |
//! | [`parse`] | exactly one plain `SELECT`, no CTE, no `INTO` |
//! | [`resolve`] | every table/column exists, canonical case, no wildcards |
//! | [`tenant`] | every tenant-bearing reference is filtered, join-aware |
//! | [`paginate`] | `LIMIT fetch OFFSET page`, model offsets refused |
//! | [`serialize`] | emitted SQL re-passes the guard |

mod ast;
pub mod guard;
pub mod paginate;
pub mod parse;
pub mod resolve;
pub mod serialize;
pub mod tenant;

pub use guard::LexicalGuard;
pub use paginate::{apply_pagination, PageLimits};
pub use parse::parse_select;
pub use resolve::{JoinKind, Resolution, Resolver, SensitiveColumns, TenantTarget};
pub use serialize::serialize;
pub use tenant::inject_tenant_filters;
