//! Upstream resources exposed through the gateway

/// A collection the upstream API owns and the gateway forwards to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    Users,
    Roles,
    Permissions,
    Doctors,
    Floors,
    Offices,
    DoctorSchedules,
    Patients,
    MedicalHistory,
    ChatbotPrompts,
}

impl Resource {
    pub const ALL: [Resource; 10] = [
        Resource::Users,
        Resource::Roles,
        Resource::Permissions,
        Resource::Doctors,
        Resource::Floors,
        Resource::Offices,
        Resource::DoctorSchedules,
        Resource::Patients,
        Resource::MedicalHistory,
        Resource::ChatbotPrompts,
    ];

    /// Collection path, shared by the local `/api` surface and the upstream
    pub fn path(self) -> &'static str {
        match self {
            Resource::Users => "/users",
            Resource::Roles => "/roles",
            Resource::Permissions => "/permissions",
            Resource::Doctors => "/doctors",
            Resource::Floors => "/floors",
            Resource::Offices => "/offices",
            Resource::DoctorSchedules => "/doctor-schedules",
            Resource::Patients => "/patients",
            Resource::MedicalHistory => "/medical-history",
            Resource::ChatbotPrompts => "/chatbot/prompts",
        }
    }

    /// Whether the upstream offers `POST {id}/activate`
    pub fn supports_activation(self) -> bool {
        !matches!(self, Resource::MedicalHistory)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn paths_are_unique_and_rooted() {
        let mut paths: Vec<_> = Resource::ALL.iter().map(|r| r.path()).collect();
        assert!(paths.iter().all(|p| p.starts_with('/') && !p.ends_with('/')));
        paths.sort();
        paths.dedup();
        assert_eq!(paths.len(), Resource::ALL.len());
    }

    #[test]
    fn medical_history_has_no_activation() {
        assert!(!Resource::MedicalHistory.supports_activation());
        assert!(Resource::Patients.supports_activation());
    }
}
