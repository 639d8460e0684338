use crate::{
    algorithms::{
        ClassifierConfig, DouglasPeuckerSimplifier, FixedThresholdBinarizer, FloodFillExtractor,
        GaussianBlurPreprocessor, MooreTracer, OtsuBinarizer, RuleBasedClassifier,
    },
    config::{DetectorConfig, ThresholdMode},
    pipeline::Pipeline,
    traits::{
        Binarizer, BoundaryTracer, ComponentExtractor, IntensityPreprocessor, PolygonSimplifier,
        ShapeClassifier,
    },
};

/// Default RDP tolerance as a fraction of the traced perimeter
pub const DEFAULT_EPSILON_FRACTION: f64 = 0.042;

/// Builder for creating detection pipelines with a fluent API
pub struct PipelineBuilder {
    preprocessors: Vec<Box<dyn IntensityPreprocessor>>,
    binarizer: Option<Box<dyn Binarizer>>,
    component_extractor: Option<Box<dyn ComponentExtractor>>,
    tracer: Option<Box<dyn BoundaryTracer>>,
    simplifier: Option<Box<dyn PolygonSimplifier>>,
    classifier: Option<Box<dyn ShapeClassifier>>,
    epsilon_fraction: f64,
    parallel: bool,
}

impl PipelineBuilder {
    pub fn new() -> Self {
        Self {
            preprocessors: Vec::new(),
            binarizer: None,
            component_extractor: None,
            tracer: None,
            simplifier: None,
            classifier: None,
            epsilon_fraction: DEFAULT_EPSILON_FRACTION,
            parallel: false,
        }
    }

    /// Builder preloaded with every setting of `config`
    pub fn from_config(config: &DetectorConfig) -> Self {
        let mut builder = Self::new()
            .with_epsilon_fraction(config.epsilon_fraction)
            .with_parallel(config.parallel)
            .with_classifier_config(config.classifier.clone());

        if let Some(sigma) = config.blur_sigma {
            builder = builder.with_gaussian_blur(sigma);
        }
        if let ThresholdMode::Fixed { value } = config.threshold {
            builder = builder.with_fixed_threshold(value);
        }
        builder
    }

    /// Add an intensity preprocessor; preprocessors run in insertion order
    pub fn add_preprocessor<P>(mut self, preprocessor: P) -> Self
    where
        P: IntensityPreprocessor + 'static,
    {
        self.preprocessors.push(Box::new(preprocessor));
        self
    }

    pub fn with_gaussian_blur(self, sigma: f32) -> Self {
        self.add_preprocessor(GaussianBlurPreprocessor { sigma })
    }

    /// Set the binarizer (replaces any existing one)
    pub fn set_binarizer<B>(mut self, binarizer: B) -> Self
    where
        B: Binarizer + 'static,
    {
        self.binarizer = Some(Box::new(binarizer));
        self
    }

    pub fn with_fixed_threshold(self, threshold: u8) -> Self {
        self.set_binarizer(FixedThresholdBinarizer { threshold })
    }

    /// Set the component extractor (replaces any existing one)
    pub fn set_component_extractor<E>(mut self, extractor: E) -> Self
    where
        E: ComponentExtractor + 'static,
    {
        self.component_extractor = Some(Box::new(extractor));
        self
    }

    /// Set the boundary tracer (replaces any existing one)
    pub fn set_boundary_tracer<T>(mut self, tracer: T) -> Self
    where
        T: BoundaryTracer + 'static,
    {
        self.tracer = Some(Box::new(tracer));
        self
    }

    /// Set the polygon simplifier (replaces any existing one)
    pub fn set_simplifier<S>(mut self, simplifier: S) -> Self
    where
        S: PolygonSimplifier + 'static,
    {
        self.simplifier = Some(Box::new(simplifier));
        self
    }

    /// Set the shape classifier (replaces any existing one)
    pub fn set_classifier<C>(mut self, classifier: C) -> Self
    where
        C: ShapeClassifier + 'static,
    {
        self.classifier = Some(Box::new(classifier));
        self
    }

    pub fn with_classifier_config(self, config: ClassifierConfig) -> Self {
        self.set_classifier(RuleBasedClassifier::new(config))
    }

    /// Negative fractions are clamped to zero
    pub fn with_epsilon_fraction(mut self, fraction: f64) -> Self {
        self.epsilon_fraction = fraction.max(0.0);
        self
    }

    pub fn with_parallel(mut self, parallel: bool) -> Self {
        self.parallel = parallel;
        self
    }

    /// Build the pipeline with default components if not specified
    pub fn build(self) -> Pipeline {
        let binarizer = self.binarizer.unwrap_or_else(|| Box::new(OtsuBinarizer));
        let component_extractor = self
            .component_extractor
            .unwrap_or_else(|| Box::new(FloodFillExtractor));
        let tracer = self.tracer.unwrap_or_else(|| Box::new(MooreTracer::default()));
        let simplifier = self
            .simplifier
            .unwrap_or_else(|| Box::new(DouglasPeuckerSimplifier));
        let classifier = self
            .classifier
            .unwrap_or_else(|| Box::new(RuleBasedClassifier::default()));

        Pipeline::new(
            self.preprocessors,
            binarizer,
            component_extractor,
            tracer,
            simplifier,
            classifier,
            self.epsilon_fraction,
            self.parallel,
        )
    }
}

impl Default for PipelineBuilder {
    fn default() -> Self {
        Self::new()
    }
}
