//! Catalog of exportable user attributes.

use serde::Serialize;

/// Identity attributes that are always fetched and always emitted.
pub const CORE_FIELDS: [&str; 3] = ["id", "userPrincipalName", "displayName"];

/// Menu key that aborts the selection.
pub const EXIT_MENU_KEY: &str = "7";

/// Optional user attribute an operator can ask for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(into = "&'static str")]
pub enum UserField {
    AccountEnabled,
    LastPasswordChangeDateTime,
    OfficeLocation,
    BusinessPhones,
    MobilePhone,
    SignInActivity,
}

/// Shape of a field's zero value in the default template.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Boolean,
    Timestamp,
    String,
    List,
    /// Nested object with a fixed set of sub-fields.
    Composite,
}

impl UserField {
    /// Every optional field in menu order.
    pub const ALL: [UserField; 6] = [
        UserField::AccountEnabled,
        UserField::LastPasswordChangeDateTime,
        UserField::OfficeLocation,
        UserField::BusinessPhones,
        UserField::MobilePhone,
        UserField::SignInActivity,
    ];

    /// Graph property name.
    #[must_use]
    pub fn key(&self) -> &'static str {
        match self {
            Self::AccountEnabled => "accountEnabled",
            Self::LastPasswordChangeDateTime => "lastPasswordChangeDateTime",
            Self::OfficeLocation => "officeLocation",
            Self::BusinessPhones => "businessPhones",
            Self::MobilePhone => "mobilePhone",
            Self::SignInActivity => "signInActivity",
        }
    }

    /// Number shown in the selection menu.
    #[must_use]
    pub fn menu_key(&self) -> &'static str {
        match self {
            Self::AccountEnabled => "1",
            Self::LastPasswordChangeDateTime => "2",
            Self::OfficeLocation => "3",
            Self::BusinessPhones => "4",
            Self::MobilePhone => "5",
            Self::SignInActivity => "6",
        }
    }

    #[must_use]
    pub fn label(&self) -> &'static str {
        match self {
            Self::AccountEnabled => "Account Enabled",
            Self::LastPasswordChangeDateTime => "Last Password Change",
            Self::OfficeLocation => "Office Location",
            Self::BusinessPhones => "Business Phones",
            Self::MobilePhone => "Mobile Phone",
            Self::SignInActivity => "Sign-in Activity",
        }
    }

    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::AccountEnabled => "Whether the account is enabled",
            Self::LastPasswordChangeDateTime => "Password last reset/change time",
            Self::OfficeLocation => "Office/desk location",
            Self::BusinessPhones => "List of business phone numbers",
            Self::MobilePhone => "User's mobile phone number",
            Self::SignInActivity => "Recent sign-in activity timestamps",
        }
    }

    #[must_use]
    pub fn kind(&self) -> FieldKind {
        match self {
            Self::AccountEnabled => FieldKind::Boolean,
            Self::LastPasswordChangeDateTime => FieldKind::Timestamp,
            Self::OfficeLocation | Self::MobilePhone => FieldKind::String,
            Self::BusinessPhones => FieldKind::List,
            Self::SignInActivity => FieldKind::Composite,
        }
    }

    /// Fields Graph pages slowly; selecting one lowers the page size.
    #[must_use]
    pub fn is_expensive(&self) -> bool {
        matches!(self, Self::SignInActivity)
    }

    /// Looks a field up by menu number.
    #[must_use]
    pub fn from_menu_key(menu_key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.menu_key() == menu_key)
    }

    /// Looks a field up by Graph property name, ignoring case.
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|f| f.key().eq_ignore_ascii_case(key))
    }
}

impl From<UserField> for &'static str {
    fn from(field: UserField) -> Self {
        field.key()
    }
}

impl std::fmt::Display for UserField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.key())
    }
}
